//! 运行时间格式化
//!
//! 输出 `H:MM:SS`，有亚秒部分时追加 `.ffffff`（微秒，截断），
//! 超过 24 小时加 `N day, ` / `N days, ` 前缀。

use std::time::Duration;

const SECS_PER_DAY: u64 = 86_400;

pub fn format_uptime(uptime: Duration) -> String {
    let total_secs = uptime.as_secs();
    let days = total_secs / SECS_PER_DAY;
    let rem = total_secs % SECS_PER_DAY;
    let (hours, minutes, seconds) = (rem / 3600, rem % 3600 / 60, rem % 60);
    let micros = uptime.subsec_micros();

    let mut out = String::new();
    if days > 0 {
        let plural = if days == 1 { "" } else { "s" };
        out.push_str(&format!("{days} day{plural}, "));
    }
    out.push_str(&format!("{hours}:{minutes:02}:{seconds:02}"));
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}
