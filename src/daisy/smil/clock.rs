//! SMIL时钟值解析
//!
//! 支持 `npt=` 前缀、时间单位后缀（h、min、s、ms）以及 `H:M:S.frac`、`M:S.frac` 两种时钟格式。
//! 结果以毫秒表示，不足一毫秒的部分被舍去。

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// 把时钟值解析为毫秒
///
/// # 参数
/// * `value` - 例如 `npt=12.5s`、`0:01:02.250`、`1500ms`
///
/// # 返回值
/// * `Option<u64>` - 无法识别时返回None
pub fn parse_clock_ms(value: &str) -> Option<u64> {
    let value = value.trim();
    let value = value.strip_prefix("npt=").unwrap_or(value).trim();
    if value.is_empty() {
        return None;
    }

    if value.contains(':') {
        return parse_clock(value);
    }

    let (number, unit) = if let Some(number) = value.strip_suffix("ms") {
        (number, 1)
    } else if let Some(number) = value.strip_suffix("min") {
        (number, MS_PER_MINUTE)
    } else if let Some(number) = value.strip_suffix('h') {
        (number, MS_PER_HOUR)
    } else if let Some(number) = value.strip_suffix('s') {
        (number, MS_PER_SECOND)
    } else {
        (value, MS_PER_SECOND)
    };
    scaled_decimal(number.trim(), unit)
}

/// `H:M:S(.frac)` 或 `M:S(.frac)`
fn parse_clock(value: &str) -> Option<u64> {
    let parts: Vec<&str> = value.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (integer(h)?, integer(m)?, *s),
        [m, s] => (0, integer(m)?, *s),
        _ => return None,
    };
    let seconds = seconds.strip_suffix('s').unwrap_or(seconds);
    let millis = scaled_decimal(seconds, MS_PER_SECOND)?;

    hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?
        .checked_add(millis)
}

fn integer(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// 十进制小数乘以单位，整数运算，向下取整
fn scaled_decimal(number: &str, unit: u64) -> Option<u64> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let whole = if whole.is_empty() { 0 } else { integer(whole)? };

    let mut total = u128::from(whole) * u128::from(unit);
    if !fraction.is_empty() {
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // 超过18位的小数对毫秒没有影响
        let fraction = &fraction[..fraction.len().min(18)];
        let numerator: u128 = fraction.parse().ok()?;
        let denominator = 10u128.pow(fraction.len() as u32);
        total += numerator * u128::from(unit) / denominator;
    }
    u64::try_from(total).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds() {
        assert_eq!(parse_clock_ms("npt=12.5s"), Some(12_500));
        assert_eq!(parse_clock_ms("npt=0.000s"), Some(0));
        assert_eq!(parse_clock_ms("3"), Some(3_000));
        assert_eq!(parse_clock_ms("2.4999s"), Some(2_499));
        assert_eq!(parse_clock_ms(".5s"), Some(500));
    }

    #[test]
    fn test_units() {
        assert_eq!(parse_clock_ms("1500ms"), Some(1_500));
        assert_eq!(parse_clock_ms("2min"), Some(120_000));
        assert_eq!(parse_clock_ms("1.5h"), Some(5_400_000));
    }

    #[test]
    fn test_clock_forms() {
        assert_eq!(parse_clock_ms("npt=0:01:02.250"), Some(62_250));
        assert_eq!(parse_clock_ms("1:00:00"), Some(3_600_000));
        assert_eq!(parse_clock_ms("02:03.5"), Some(123_500));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(parse_clock_ms(""), None);
        assert_eq!(parse_clock_ms("npt="), None);
        assert_eq!(parse_clock_ms("abc"), None);
        assert_eq!(parse_clock_ms("1:2:3:4"), None);
        assert_eq!(parse_clock_ms("-1s"), None);
        assert_eq!(parse_clock_ms("1.2.3s"), None);
    }
}
