//! Percent-extraction rules, tried in priority order.
//!
//! Each matcher looks at one ANSI-free line and either produces a reading
//! or declines. Numbers that fail to parse, overflow, or would divide by
//! zero make the matcher decline so the next rule gets a chance.

use super::types::{FALLBACK_LABEL, Heuristic};
use regex::Regex;
use std::sync::LazyLock;

static ANSI_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

static ITEM_COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Downloading item (\d+) of (\d+)").unwrap());

static RATIO_COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*/\s*(\d+)").unwrap());

static BRACKETED_DOWNLOAD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[download\]\s*([0-9]+(?:\.[0-9]+)?)%").unwrap());

static BARE_PERCENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)%").unwrap());

static ANY_PERCENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)%").unwrap());

/// Remove terminal color sequences (`ESC[...m`). Anything else is left as-is.
pub fn strip_ansi(line: &str) -> String {
    ANSI_COLOR_REGEX.replace_all(line, "").into_owned()
}

/// Where the label of a reading comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LabelSource {
    /// Use the interpreter's current phase label.
    Current,
    /// Use this label for this update only.
    Override(String),
}

/// Result of a successful matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reading {
    pub percent: u32,
    pub label: LabelSource,
}

type Matcher = fn(&str) -> Option<Reading>;

/// Percent rules, highest priority first. The first `Some` wins.
pub(crate) const HEURISTICS: &[(Heuristic, Matcher)] = &[
    (Heuristic::ItemCount, item_count),
    (Heuristic::RatioCount, ratio_count),
    (Heuristic::BracketedDownload, bracketed_download),
    (Heuristic::BarePercent, bare_percent),
    (Heuristic::AnyPercent, any_percent),
];

/// Run the rules in order and return the first reading.
pub(crate) fn first_match(line: &str) -> Option<(Heuristic, Reading)> {
    HEURISTICS
        .iter()
        .find_map(|(heuristic, matcher)| matcher(line).map(|reading| (*heuristic, reading)))
}

fn item_count(line: &str) -> Option<Reading> {
    let caps = ITEM_COUNT_REGEX.captures(line)?;
    let cur: u64 = caps.get(1)?.as_str().parse().ok()?;
    let tot: u64 = caps.get(2)?.as_str().parse().ok()?;
    Some(Reading {
        percent: ratio_percent(cur, tot)?,
        label: LabelSource::Override(format!("Downloading item {} of {}", cur, tot)),
    })
}

fn ratio_count(line: &str) -> Option<Reading> {
    let caps = RATIO_COUNT_REGEX.captures(line)?;
    let cur: u64 = caps.get(1)?.as_str().parse().ok()?;
    let tot: u64 = caps.get(2)?.as_str().parse().ok()?;
    Some(Reading {
        percent: ratio_percent(cur, tot)?,
        label: LabelSource::Current,
    })
}

fn bracketed_download(line: &str) -> Option<Reading> {
    leading_percent(&BRACKETED_DOWNLOAD_REGEX, line, LabelSource::Current)
}

fn bare_percent(line: &str) -> Option<Reading> {
    leading_percent(&BARE_PERCENT_REGEX, line, LabelSource::Current)
}

fn any_percent(line: &str) -> Option<Reading> {
    leading_percent(
        &ANY_PERCENT_REGEX,
        line,
        LabelSource::Override(FALLBACK_LABEL.to_string()),
    )
}

fn leading_percent(regex: &Regex, line: &str, label: LabelSource) -> Option<Reading> {
    let caps = regex.captures(line)?;
    let percent = truncate_decimal(caps.get(1)?.as_str())?;
    Some(Reading { percent, label })
}

/// `floor(cur * 100 / tot)`, or `None` for a zero total or overflow.
fn ratio_percent(cur: u64, tot: u64) -> Option<u32> {
    if tot == 0 {
        return None;
    }
    let scaled = cur.checked_mul(100)?;
    u32::try_from(scaled / tot).ok()
}

/// Parse a decimal like `37.5` and drop the fraction.
fn truncate_decimal(raw: &str) -> Option<u32> {
    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value.trunc() as u32)
}
