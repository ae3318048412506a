const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// 人类可读的文件大小：最多两位小数，去掉末尾的 0。
///
/// 超过 TB 的值仍以 TB 表示。
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return String::from("0 Bytes");
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;
    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    // 先四舍五入到两位，{:.2} 本身遇到 .xx5 会向偶数舍入
    let rounded = (size * 100.0).round() / 100.0;
    let fixed = format!("{:.2}", rounded);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit_index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_reference_values() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1 MB");
    }

    #[test]
    fn picks_largest_unit_not_below_one() {
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
        assert_eq!(format_size(1025), "1 KB");
        assert_eq!(format_size(1_288_490_189), "1.2 GB");
        assert_eq!(format_size(1024u64.pow(4) * 3), "3 TB");
    }

    #[test]
    fn rounds_to_two_digits() {
        assert_eq!(format_size(1100), "1.07 KB");
        assert_eq!(format_size(10 * 1024 + 10), "10.01 KB");
        // 1.125 / 1.375 KB 正好落在半分位上，向上进位
        assert_eq!(format_size(1152), "1.13 KB");
        assert_eq!(format_size(1408), "1.38 KB");
        assert_eq!(format_size(1_179_648), "1.13 MB");
    }

    #[test]
    fn stays_in_terabytes_past_the_table() {
        assert_eq!(format_size(1024u64.pow(5)), "1024 TB");
    }
}
