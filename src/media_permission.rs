#[cfg(target_os = "macos")]
use std::time::Duration;

#[cfg(target_os = "macos")]
use objc::runtime::Object;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicrophoneAccess {
    Granted,
    Denied,
    NotDetermined,
}

/// The OS prompt can sit unanswered; give up on it after this long.
#[cfg(target_os = "macos")]
const MICROPHONE_PROMPT_TIMEOUT: Duration = Duration::from_secs(120);

#[cfg(target_os = "macos")]
#[link(name = "AVFoundation", kind = "framework")]
extern "C" {
    static AVMediaTypeAudio: *mut Object;
}

/// `NotDetermined` still allows capture: the webview's first `getUserMedia` call raises the
/// OS prompt itself.
pub fn access_allows_capture(access: MicrophoneAccess) -> bool {
    !matches!(access, MicrophoneAccess::Denied)
}

/// Only an undecided status raises the prompt. A prompt that never answers (`None`) falls back
/// to `access_allows_capture`.
pub fn resolve_permission_request<P>(access: MicrophoneAccess, prompt: P) -> bool
where
    P: FnOnce() -> Option<bool>,
{
    match access {
        MicrophoneAccess::NotDetermined => {
            prompt().unwrap_or_else(|| access_allows_capture(access))
        }
        _ => access_allows_capture(access),
    }
}

#[cfg(target_os = "macos")]
fn access_from_av_status(status: i64) -> MicrophoneAccess {
    // AVAuthorizationStatus: 0 notDetermined, 1 restricted, 2 denied, 3 authorized.
    match status {
        0 => MicrophoneAccess::NotDetermined,
        3 => MicrophoneAccess::Granted,
        _ => MicrophoneAccess::Denied,
    }
}

#[cfg(target_os = "macos")]
pub fn microphone_access() -> MicrophoneAccess {
    use objc::{class, msg_send, sel, sel_impl};

    let status: i64 = unsafe {
        msg_send![class!(AVCaptureDevice), authorizationStatusForMediaType: AVMediaTypeAudio]
    };
    access_from_av_status(status)
}

#[cfg(not(target_os = "macos"))]
pub fn microphone_access() -> MicrophoneAccess {
    MicrophoneAccess::Granted
}

/// Shows the system microphone prompt and blocks until it is answered. Needs
/// `NSMicrophoneUsageDescription` in the bundle's Info.plist or the process is killed.
#[cfg(target_os = "macos")]
fn prompt_for_microphone_access() -> Option<bool> {
    use block::ConcreteBlock;
    use objc::{class, msg_send, runtime::NO, sel, sel_impl};

    let (tx, rx) = std::sync::mpsc::channel();
    let handler = ConcreteBlock::new(move |granted: objc::runtime::BOOL| {
        let _ = tx.send(granted != NO);
    })
    .copy();

    unsafe {
        let _: () = msg_send![
            class!(AVCaptureDevice),
            requestAccessForMediaType: AVMediaTypeAudio
            completionHandler: &*handler
        ];
    }

    match rx.recv_timeout(MICROPHONE_PROMPT_TIMEOUT) {
        Ok(granted) => Some(granted),
        Err(error) => {
            tracing::warn!(%error, "microphone prompt did not complete");
            None
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn prompt_for_microphone_access() -> Option<bool> {
    Some(true)
}

/// Blocking; call from a worker thread.
pub fn request_microphone_permission() -> bool {
    let access = microphone_access();
    let granted = resolve_permission_request(access, prompt_for_microphone_access);
    tracing::info!(access = ?access, granted, "microphone permission requested");
    granted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_denied_access_blocks_capture() {
        assert!(access_allows_capture(MicrophoneAccess::Granted));
        assert!(access_allows_capture(MicrophoneAccess::NotDetermined));
        assert!(!access_allows_capture(MicrophoneAccess::Denied));
    }

    #[test]
    fn undecided_access_raises_the_prompt() {
        let mut prompted = false;
        let granted = resolve_permission_request(MicrophoneAccess::NotDetermined, || {
            prompted = true;
            Some(true)
        });
        assert!(prompted);
        assert!(granted);
    }

    #[test]
    fn declined_prompt_is_reported_as_denied() {
        assert!(!resolve_permission_request(
            MicrophoneAccess::NotDetermined,
            || Some(false)
        ));
    }

    #[test]
    fn unanswered_prompt_leaves_capture_to_the_webview() {
        assert!(resolve_permission_request(
            MicrophoneAccess::NotDetermined,
            || None
        ));
    }

    #[test]
    fn recorded_answers_never_prompt() {
        let mut prompts = 0;
        assert!(resolve_permission_request(MicrophoneAccess::Granted, || {
            prompts += 1;
            Some(false)
        }));
        assert!(!resolve_permission_request(MicrophoneAccess::Denied, || {
            prompts += 1;
            Some(true)
        }));
        assert_eq!(prompts, 0);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn av_status_codes_map_to_access() {
        assert_eq!(access_from_av_status(0), MicrophoneAccess::NotDetermined);
        assert_eq!(access_from_av_status(1), MicrophoneAccess::Denied);
        assert_eq!(access_from_av_status(2), MicrophoneAccess::Denied);
        assert_eq!(access_from_av_status(3), MicrophoneAccess::Granted);
    }
}
