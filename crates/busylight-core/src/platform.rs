//! Host platform detection and per-platform payload framing.

use tracing::info;

/// `"{System}_{release}"` for the running host, e.g. `Linux_6.8.0`.
///
/// System names follow the conventional `Windows`, `Linux` and `Darwin`
/// spellings; other hosts report their lowercase OS name.
pub fn current_platform() -> String {
    let system = match std::env::consts::OS {
        "windows" => "Windows",
        "linux" => "Linux",
        "macos" => "Darwin",
        other => other,
    };
    let info = os_info::get();
    format!("{system}_{}", info.version())
}

/// Frame an output report for the host HID stack.
///
/// Windows expects a leading report id byte, so a zero is prepended.
/// Linux and Darwin take the payload as is. Anything else is logged and
/// written unmodified.
pub fn frame_output_report(platform: &str, payload: &[u8]) -> Vec<u8> {
    let system = platform.split('_').next().unwrap_or_default();
    match system {
        "Windows" => {
            let mut framed = Vec::with_capacity(payload.len() + 1);
            framed.push(0);
            framed.extend_from_slice(payload);
            framed
        }
        "Linux" | "Darwin" => payload.to_vec(),
        _ => {
            info!("Unsupported OS {platform}, hoping for the best.");
            payload.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_windows_prepends_report_id() {
        assert_eq!(frame_output_report("Windows_10", &[1, 2]), vec![0, 1, 2]);
        assert_eq!(frame_output_report("Windows_11", &[]), vec![0]);
    }

    #[test]
    fn test_unix_payload_unmodified() {
        assert_eq!(frame_output_report("Linux_6.8.0", &[1, 2]), vec![1, 2]);
        assert_eq!(frame_output_report("Darwin_23.1.0", &[3]), vec![3]);
    }

    #[traced_test]
    #[test]
    fn test_unknown_platform_logs_and_passes_through() {
        assert_eq!(frame_output_report("Plan9_4", &[7, 8]), vec![7, 8]);
        assert!(logs_contain("Unsupported OS Plan9_4, hoping for the best."));
    }

    #[test]
    fn test_current_platform_shape() {
        let platform = current_platform();
        assert!(platform.contains('_'), "{platform}");
        #[cfg(target_os = "linux")]
        assert!(platform.starts_with("Linux_"));
    }
}
