//! Per-platform probe chains. Each chain tries its strategies in order and returns the
//! first usable value.

use crate::error::ProbeError;
use crate::parse;
use crate::platform::Platform;
use crate::runner::CommandRunner;
use std::path::Path;
use tracing::trace;

/// One strategy: a command or file plus the parser applied to its output.
#[derive(Debug, Clone, Copy)]
enum Source {
    Command(&'static str, &'static [&'static str]),
    File(&'static str),
}

type Parser = fn(&str) -> Option<String>;

const LINUX_CPU: &[(Source, Parser)] = &[
    (Source::File("/proc/cpuinfo"), parse::cpuinfo_model),
    (Source::Command("dmidecode", &["-t", "processor"]), parse::dmidecode_processor_id),
];

const LINUX_MOTHERBOARD: &[(Source, Parser)] = &[
    (Source::Command("dmidecode", &["-t", "baseboard"]), parse::serial_number),
    (Source::Command("lshw", &["-c", "motherboard"]), parse::lshw_serial),
];

const LINUX_DISK: &[(Source, Parser)] = &[
    (Source::Command("lsblk", &["-nd", "-o", "SERIAL", "/dev/sda"]), parse::plain_serial),
    (Source::File("/sys/block/sda/device/serial"), parse::plain_serial),
    (Source::Command("hdparm", &["-I", "/dev/sda"]), parse::serial_number),
    (Source::Command("dmidecode", &["-t", "disk"]), parse::serial_number),
];

const WINDOWS_CPU: &[(Source, Parser)] =
    &[(Source::Command("wmic", &["cpu", "get", "ProcessorId"]), parse::wmic_squeezed)];

const WINDOWS_MOTHERBOARD: &[(Source, Parser)] =
    &[(Source::Command("wmic", &["baseboard", "get", "SerialNumber"]), parse::wmic_squeezed)];

const WINDOWS_DISK: &[(Source, Parser)] =
    &[(Source::Command("wmic", &["diskdrive", "get", "SerialNumber"]), parse::wmic_disk_serial)];

const MACOS_CPU: &[(Source, Parser)] =
    &[(Source::Command("sysctl", &["-n", "machdep.cpu.brand_string"]), parse::first_line)];

const MACOS_MOTHERBOARD: &[(Source, Parser)] =
    &[(Source::Command("system_profiler", &["SPHardwareDataType"]), parse::model_identifier)];

const MACOS_DISK: &[(Source, Parser)] =
    &[(Source::Command("ioreg", &["-l"]), parse::ioreg_platform_serial)];

/// Hardware component a chain resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Component {
    Cpu,
    Motherboard,
    Disk,
}

impl Component {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Motherboard => "motherboard",
            Self::Disk => "hardDisk",
        }
    }

    const fn chain(self, platform: Platform) -> Option<&'static [(Source, Parser)]> {
        match (platform, self) {
            (Platform::Linux, Self::Cpu) => Some(LINUX_CPU),
            (Platform::Linux, Self::Motherboard) => Some(LINUX_MOTHERBOARD),
            (Platform::Linux, Self::Disk) => Some(LINUX_DISK),
            (Platform::Windows, Self::Cpu) => Some(WINDOWS_CPU),
            (Platform::Windows, Self::Motherboard) => Some(WINDOWS_MOTHERBOARD),
            (Platform::Windows, Self::Disk) => Some(WINDOWS_DISK),
            (Platform::MacOs, Self::Cpu) => Some(MACOS_CPU),
            (Platform::MacOs, Self::Motherboard) => Some(MACOS_MOTHERBOARD),
            (Platform::MacOs, Self::Disk) => Some(MACOS_DISK),
            (Platform::Other, _) => None,
        }
    }
}

/// Runs the chain for `component`, returning the last strategy error when all fail.
pub(crate) async fn probe<R: CommandRunner>(
    runner: &R,
    platform: Platform,
    component: Component,
) -> Result<String, ProbeError> {
    let Some(chain) = component.chain(platform) else {
        return Err(ProbeError::Unsupported {
            message: format!("no {} probe for {}", component.as_str(), platform.as_str()).into(),
            context: None,
        });
    };

    let mut last_error = ProbeError::empty("probe chain is empty");
    for (source, parser) in chain {
        let output = match source {
            Source::Command(program, args) => runner.run(program, args).await,
            Source::File(path) => runner.read_file(Path::new(path)).await,
        };
        match output.map(|out| parser(&out)) {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {
                trace!(component = component.as_str(), source = ?source, "Strategy produced no value");
                last_error = ProbeError::empty("strategy output had no usable value");
            },
            Err(e) => {
                trace!(component = component.as_str(), source = ?source, error = %e, "Strategy failed");
                last_error = e;
            },
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;

    #[tokio::test]
    async fn linux_disk_falls_through_to_hdparm() {
        let runner = ScriptedRunner::new()
            .command("lsblk -nd -o SERIAL /dev/sda", "\n")
            .command("hdparm -I /dev/sda", "ATA device\n\tSerial Number:      WD-WCC4N1234567\n");

        let serial = probe(&runner, Platform::Linux, Component::Disk).await.unwrap();
        assert_eq!(serial, "WD-WCC4N1234567");
        assert_eq!(
            runner.calls(),
            ["lsblk -nd -o SERIAL /dev/sda", "/sys/block/sda/device/serial", "hdparm -I /dev/sda"]
        );
    }

    #[tokio::test]
    async fn linux_cpu_prefers_cpuinfo() {
        let runner = ScriptedRunner::new().file("/proc/cpuinfo", "model name : AMD Ryzen 7\ncpu cores : 8\n");
        assert_eq!(probe(&runner, Platform::Linux, Component::Cpu).await.unwrap(), "AMD Ryzen 7-8cores");
    }

    #[tokio::test]
    async fn exhausted_chain_reports_last_error() {
        let runner = ScriptedRunner::new()
            .command("dmidecode -t baseboard", "\tSerial Number: Not Specified\n")
            .failing_command("lshw -c motherboard");

        let err = probe(&runner, Platform::Linux, Component::Motherboard).await.unwrap_err();
        assert_eq!(err.code(), "exit_status");
    }

    #[tokio::test]
    async fn other_platforms_are_unsupported() {
        let err = probe(&ScriptedRunner::new(), Platform::Other, Component::Cpu).await.unwrap_err();
        assert_eq!(err.code(), "unsupported");
    }
}
