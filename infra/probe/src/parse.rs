//! Pure parsers for probe output. Each returns `None` when nothing usable is present.

/// Values firmware vendors leave in unset serial fields.
const PLACEHOLDER_SERIALS: [&str; 4] = ["None", "Not Specified", "To be filled by O.E.M.", "Default string"];

/// `model name` from `/proc/cpuinfo`, suffixed with `-{n}cores` when `cpu cores` is present.
#[must_use]
pub fn cpuinfo_model(cpuinfo: &str) -> Option<String> {
    let model = field_value(cpuinfo, "model name", ':')?;
    Some(match field_value(cpuinfo, "cpu cores", ':') {
        Some(cores) => format!("{model}-{cores}cores"),
        None => model,
    })
}

/// `ID:` line of `dmidecode -t processor`.
#[must_use]
pub fn dmidecode_processor_id(output: &str) -> Option<String> {
    field_value(output, "ID", ':').filter(|id| id != "None")
}

/// First `Serial Number:` of `dmidecode` or `hdparm -I` output, ignoring vendor placeholders.
#[must_use]
pub fn serial_number(output: &str) -> Option<String> {
    field_value(output, "Serial Number", ':').filter(|serial| !is_placeholder(serial))
}

/// `serial:` line of `lshw -c motherboard`.
#[must_use]
pub fn lshw_serial(output: &str) -> Option<String> {
    field_value(output, "serial", ':').filter(|serial| !is_placeholder(serial))
}

/// Single-value output such as `lsblk -nd -o SERIAL` or a sysfs attribute. Values of three
/// characters or fewer are rejected as noise.
#[must_use]
pub fn plain_serial(output: &str) -> Option<String> {
    output.lines().map(str::trim).find(|line| !line.is_empty()).filter(|s| s.len() > 3).map(str::to_owned)
}

/// `wmic <class> get <prop>` squeezed into one token: all whitespace removed, header included.
///
/// Existing machine codes were derived from exactly this string, so the header stays.
#[must_use]
pub fn wmic_squeezed(output: &str) -> Option<String> {
    let squeezed: String = output.chars().filter(|c| !c.is_whitespace()).collect();
    (!squeezed.is_empty()).then_some(squeezed)
}

/// First line of `wmic diskdrive get SerialNumber` carrying a run of at least ten
/// upper-case letters or digits, cut after the last such run and trimmed.
///
/// Anything trailing the run is dropped, matching the machine codes already issued.
#[must_use]
pub fn wmic_disk_serial(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let end = serial_run_end(line)?;
        Some(line[..end].trim().to_owned())
    })
}

/// `Model Identifier:` from `system_profiler SPHardwareDataType`.
#[must_use]
pub fn model_identifier(output: &str) -> Option<String> {
    field_value(output, "Model Identifier", ':')
}

/// Quoted value on the `IOPlatformSerialNumber` line of `ioreg -l`.
#[must_use]
pub fn ioreg_platform_serial(output: &str) -> Option<String> {
    let line = output.lines().find(|line| line.contains("IOPlatformSerialNumber"))?;
    let trimmed = line.trim_end().strip_suffix('"')?;
    let start = trimmed.rfind('"')?;
    let value = trimmed[start + 1..].trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// First non-empty trimmed line.
#[must_use]
pub fn first_line(output: &str) -> Option<String> {
    output.lines().map(str::trim).find(|line| !line.is_empty()).map(str::to_owned)
}

fn field_value(text: &str, key: &str, separator: char) -> Option<String> {
    text.lines().find_map(|line| {
        let (name, value) = line.split_once(separator)?;
        if !name.trim().eq_ignore_ascii_case(key) {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    })
}

fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER_SERIALS.iter().any(|p| value.eq_ignore_ascii_case(p))
}

/// Byte offset just past the last run of at least ten upper-case letters or digits.
fn serial_run_end(line: &str) -> Option<usize> {
    const MIN_RUN: usize = 10;

    let mut run = 0;
    let mut end = None;
    for (i, c) in line.char_indices() {
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            run += 1;
            if run >= MIN_RUN {
                end = Some(i + 1);
            }
        } else {
            run = 0;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPUINFO: &str = "processor\t: 0\nvendor_id\t: GenuineIntel\nmodel name\t: Intel(R) Core(TM) i7-8700 CPU @ 3.20GHz\ncpu cores\t: 6\nflags\t\t: fpu vme\n";

    #[test]
    fn cpuinfo_appends_core_count() {
        assert_eq!(
            cpuinfo_model(CPUINFO).as_deref(),
            Some("Intel(R) Core(TM) i7-8700 CPU @ 3.20GHz-6cores")
        );
        assert_eq!(cpuinfo_model("model name : ARMv8\n").as_deref(), Some("ARMv8"));
        assert_eq!(cpuinfo_model("processor : 0\n"), None);
    }

    #[test]
    fn dmidecode_serials_skip_placeholders() {
        let board = "Base Board Information\n\tManufacturer: ASUSTeK\n\tSerial Number: 190436713800125\n";
        assert_eq!(serial_number(board).as_deref(), Some("190436713800125"));
        assert_eq!(serial_number("\tSerial Number: Not Specified\n"), None);
        assert_eq!(serial_number("\tSerial Number: To be filled by O.E.M.\n"), None);
        assert_eq!(serial_number("\tSerial Number:   \n"), None);
    }

    #[test]
    fn processor_id_is_read() {
        let out = "Processor Information\n\tSocket Designation: CPU0\n\tID: EA 06 09 00 FF FB EB BF\n";
        assert_eq!(dmidecode_processor_id(out).as_deref(), Some("EA 06 09 00 FF FB EB BF"));
        assert_eq!(dmidecode_processor_id("\tID: None\n"), None);
    }

    #[test]
    fn lshw_and_plain_serials() {
        assert_eq!(lshw_serial("  *-core\n       serial: MB-1234\n").as_deref(), Some("MB-1234"));
        assert_eq!(plain_serial("\nS3Z9NB0K\n").as_deref(), Some("S3Z9NB0K"));
        assert_eq!(plain_serial("abc\n"), None);
    }

    #[test]
    fn wmic_outputs() {
        assert_eq!(
            wmic_squeezed("ProcessorId       \r\nBFEBFBFF000906EA  \r\n\r\n").as_deref(),
            Some("ProcessorIdBFEBFBFF000906EA")
        );
        assert_eq!(wmic_squeezed(" \r\n "), None);
        assert_eq!(
            wmic_disk_serial("SerialNumber\r\nS4EWNF0M123456A     \r\n").as_deref(),
            Some("S4EWNF0M123456A")
        );
        assert_eq!(wmic_disk_serial("SerialNumber\r\nshort\r\n"), None);
    }

    #[test]
    fn wmic_disk_serial_drops_text_after_the_last_run() {
        assert_eq!(
            wmic_disk_serial("SerialNumber\r\nWD-WCC4N1234567.\r\n").as_deref(),
            Some("WD-WCC4N1234567")
        );
        assert_eq!(
            wmic_disk_serial("SerialNumber\r\n  0000_0000_0100_0000_E4D2_5C8A_1B2C_0001.\r\n").as_deref(),
            None
        );
        assert_eq!(
            wmic_disk_serial("SerialNumber\r\nABCDEFGHIJ-x-KLMNOPQRST_tail\r\n").as_deref(),
            Some("ABCDEFGHIJ-x-KLMNOPQRST")
        );
    }

    #[test]
    fn macos_outputs() {
        let profiler = "Hardware:\n\n    Hardware Overview:\n\n      Model Name: MacBook Pro\n      Model Identifier: MacBookPro18,3\n";
        assert_eq!(model_identifier(profiler).as_deref(), Some("MacBookPro18,3"));

        let ioreg = "    | |   \"IOPlatformSerialNumber\" = \"C02XK1JHJGH5\"\n";
        assert_eq!(ioreg_platform_serial(ioreg).as_deref(), Some("C02XK1JHJGH5"));
        assert_eq!(ioreg_platform_serial("nothing here"), None);
    }
}
