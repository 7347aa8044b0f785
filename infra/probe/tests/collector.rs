use std::time::Duration;
use tether_domain::constants::{UNKNOWN_CPU, UNKNOWN_HD, UNKNOWN_MAC, UNKNOWN_MB};
use tether_probe::{FingerprintCollector, Platform, ScriptedRunner};

fn windows_host() -> ScriptedRunner {
    ScriptedRunner::new()
        .command("wmic cpu get ProcessorId", "ProcessorId      \r\nBFEBFBFF000906EA \r\n")
        .command("wmic baseboard get SerialNumber", "SerialNumber\r\n190436713800125\r\n")
        .command("wmic diskdrive get SerialNumber", "SerialNumber\r\nS4EWNF0M123456A  \r\n")
}

#[tokio::test]
async fn windows_host_resolves_every_field() {
    let collector = FingerprintCollector::new(windows_host(), Platform::Windows, Duration::from_secs(5))
        .with_mac(Some("AABBCCDDEEFF".to_owned()));

    let fp = collector.collect().await;

    assert_eq!(fp.mac(), "AABBCCDDEEFF");
    assert_eq!(fp.cpu(), "ProcessorIdBFEBFBFF000906EA");
    assert_eq!(fp.motherboard(), "SerialNumber190436713800125");
    assert_eq!(fp.disk_serial(), "S4EWNF0M123456A");
    assert!(!fp.is_degraded());
}

#[tokio::test]
async fn missing_tools_become_sentinels() {
    let collector = FingerprintCollector::new(ScriptedRunner::new(), Platform::Linux, Duration::from_secs(5))
        .with_mac(None);

    let fp = collector.collect().await;

    assert_eq!(fp.mac(), UNKNOWN_MAC);
    assert_eq!(fp.cpu(), UNKNOWN_CPU);
    assert_eq!(fp.motherboard(), UNKNOWN_MB);
    assert_eq!(fp.disk_serial(), UNKNOWN_HD);
    assert_eq!(fp.degraded_fields(), ["mac", "cpu", "motherboard", "hardDisk"]);
    assert!(!collector.collect_detailed().await.timed_out);
}

#[tokio::test(start_paused = true)]
async fn deadline_keeps_partial_results() {
    let runner = ScriptedRunner::new()
        .file("/proc/cpuinfo", "model name : Xeon\ncpu cores : 4\n")
        .slow_command("dmidecode -t baseboard", "\tSerial Number: MB-1\n", Duration::from_secs(30))
        .command("lsblk -nd -o SERIAL /dev/sda", "DISK-0001\n");
    let collector = FingerprintCollector::new(runner, Platform::Linux, Duration::from_secs(5))
        .with_mac(Some("001122334455".to_owned()));

    let collection = collector.collect_detailed().await;
    assert!(collection.timed_out);

    let fp = collection.fingerprint;
    assert_eq!(fp.cpu(), "Xeon-4cores");
    assert_eq!(fp.motherboard(), UNKNOWN_MB);
    // The disk chain never started.
    assert_eq!(fp.disk_serial(), UNKNOWN_HD);
    assert!(!collector.runner().calls().iter().any(|call| call.starts_with("lsblk")));
}

#[tokio::test]
async fn unsupported_platform_still_yields_mac() {
    let collector = FingerprintCollector::new(ScriptedRunner::new(), Platform::Other, Duration::from_secs(1))
        .with_mac(Some("0A0B0C0D0E0F".to_owned()));

    let fp = collector.collect().await;

    assert_eq!(fp.canonical(), format!("0A0B0C0D0E0F-{UNKNOWN_CPU}-{UNKNOWN_HD}-{UNKNOWN_MB}"));
    assert!(collector.runner().calls().is_empty());
}
