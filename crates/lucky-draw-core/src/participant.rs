// Participant records and the cosmetic pool generator.

use rand::seq::SliceRandom;
use rand::Rng;

/// A single entrant in the draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Unique within a pool, assigned sequentially from 1.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Avatar image URL.
    pub avatar: String,
    /// Set on winners produced by an add-winner round.
    pub is_additional: bool,
}

const GIVEN_NAMES: &[&str] = &[
    "Ming", "Hua", "Wei", "Fen", "Jie", "Ling", "Hong", "Ting", "Hao", "Jun",
    "Han", "Qi", "Yu", "Wen", "En", "Shan", "Xuan", "Zhen", "Xiang", "Ying",
    "Yan", "Lan", "Lin", "Rui", "Cheng", "Ping", "Yi", "Xin", "Zhi", "Rong",
    "Kai", "Mei", "Bo", "Hui", "Lei", "Jing", "Tao", "Yue", "Fei", "Yun",
];

const FAMILY_NAMES: &[&str] = &[
    "Wang", "Li", "Zhang", "Liu", "Chen", "Yang", "Huang", "Zhao", "Zhou", "Wu",
    "Xu", "Sun", "Ma", "Zhu", "Hu", "Guo", "He", "Gao", "Lin", "Luo",
    "Zheng", "Liang", "Xie", "Song", "Tang", "Han", "Feng", "Deng", "Cao", "Peng",
];

const AVATAR_COLORS: &[&str] = &[
    "7c3aed", "db2777", "059669", "0891b2", "ca8a04", "d97706", "dc2626", "4f46e5",
    "7c2d12", "166534", "1e40af", "7e22ce", "be123c", "0369a1", "4338ca", "9333ea",
];

const AVATAR_ENDPOINT: &str = "https://ui-avatars.com/api/";

/// Generate `count` participants with ids `1..=count`.
///
/// Names and avatar colours are random; only id uniqueness and ordering are
/// relied on by the rest of the crate.
pub fn generate_participants<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Participant> {
    (1..=count)
        .map(|i| {
            let family = FAMILY_NAMES.choose(rng).copied().unwrap_or("Li");
            let given = GIVEN_NAMES.choose(rng).copied().unwrap_or("Ming");
            let name = format!("{family} {given}");
            let color = AVATAR_COLORS.choose(rng).copied().unwrap_or("7c3aed");
            let avatar = avatar_url(&name, color);
            Participant {
                id: i as u32,
                name,
                avatar,
                is_additional: false,
            }
        })
        .collect()
}

/// Build the avatar URL for a display name and background colour.
pub fn avatar_url(name: &str, background: &str) -> String {
    format!(
        "{AVATAR_ENDPOINT}?name={}&background={background}&color=fff&size=128&font-size=0.4&bold=true",
        encode_component(name)
    )
}

/// Initials shown in place of the avatar image, e.g. "Chen Wei" -> "CW".
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Percent-encode everything outside the URI unreserved set.
fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
