//! Known stat labels of the raid result screen.
//!
//! The table stage recognizes labels through [`LABEL_PATTERNS`]; the CLI groups
//! them into main and additional stats the way the result screen does.

use crate::model::COMBAT_TIME_LABEL;

/// Ordered label patterns: (spacing-tolerant regex fragment, canonical label).
///
/// Order matters. Patterns are combined into one leftmost-first alternation,
/// so a longer label must come before any label that is a prefix of it.
pub const LABEL_PATTERNS: &[(&str, &str)] = &[
    (r"치명타\s*피해\s*증가\s*유효율", "치명타 피해 증가 유효율"),
    (r"치명타\s*적중률", "치명타 적중률"),
    (r"백어택\s*적중률", "백어택 적중률"),
    (r"헤드어택\s*적중률", "헤드어택 적중률"),
    (r"초당\s*피해량", "초당 피해량"),
    (r"1\s*분\s*피해량", "1분 피해량"),
    (r"받은\s*피해량", "받은 피해량"),
    (r"피해량", "피해량"),
    (r"지당타\s*자상\s*감소\s*가동률", "지당타 자상 감소 가동률"),
    (r"구슬의\s*축복\s*유효율", "구슬의 축복 유효율"),
    (r"무력화", "무력화"),
    (r"카운터\s*성공", "카운터 성공"),
    (r"저스트\s*가드\s*성공\s*횟수", "저스트 가드 성공 횟수"),
    (r"배틀\s*아이템\s*사용\s*횟수", "배틀 아이템 사용 횟수"),
];

/// Kind of anchor fragment used to recognize a label row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// Total damage amount.
    Damage,
    /// Damage per second.
    PerSecond,
    /// Buff effectiveness rate.
    Effectiveness,
    /// Any other rate column.
    Rate,
}

/// Anchor fragments, compared against a line with all whitespace removed.
pub const TABLE_ANCHORS: &[(&str, AnchorKind)] = &[
    ("피해량", AnchorKind::Damage),
    ("초당피해량", AnchorKind::PerSecond),
    ("유효율", AnchorKind::Effectiveness),
    ("적중률", AnchorKind::Rate),
    ("가동률", AnchorKind::Rate),
];

/// Anchor kinds a label row must contain.
pub const REQUIRED_ANCHORS: &[AnchorKind] = &[
    AnchorKind::Damage,
    AnchorKind::PerSecond,
    AnchorKind::Effectiveness,
];

/// Minimum number of distinct anchor fragments on a label row.
pub const MIN_ANCHOR_MATCHES: usize = 3;

/// Headline stats, always shown (missing ones as [`UNRECOGNIZED`]).
pub const MAIN_STATS: &[&str] = &[COMBAT_TIME_LABEL, "피해량", "초당 피해량", "1분 피해량"];

/// Secondary stats, shown only when recognized.
pub const ADDITIONAL_STATS: &[&str] = &[
    "치명타 적중률",
    "백어택 적중률",
    "헤드어택 적중률",
    "치명타 피해 증가 유효율",
    "받은 피해량",
    "무력화",
    "카운터 성공",
    "저스트 가드 성공 횟수",
    "배틀 아이템 사용 횟수",
    "지당타 자상 감소 가동률",
    "구슬의 축복 유효율",
];

/// Placeholder for a stat that could not be recognized.
pub const UNRECOGNIZED: &str = "미인식";
