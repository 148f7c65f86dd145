//! 存储在 `games` 与 `reviews` 文本列中的固定词表。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 不属于词表的字符串
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}; expected one of: {expected}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

vocabulary! {
    /// 游戏类型
    Genre ("genre") {
        Action => "Action",
        Adventure => "Adventure",
        Rpg => "RPG",
        Strategy => "Strategy",
        Simulation => "Simulation",
        Sports => "Sports",
        Racing => "Racing",
        Puzzle => "Puzzle",
        Platformer => "Platformer",
        Shooter => "Shooter",
        Horror => "Horror",
        Survival => "Survival",
        Indie => "Indie",
        Multiplayer => "Multiplayer",
        Other => "Other",
    }
}

vocabulary! {
    /// 游戏运行的平台类别
    Platform ("platform") {
        Pc => "PC",
        HomeConsole => "Home Console",
        HandheldConsole => "Handheld Console",
        Mobile => "Mobile",
        Other => "Other",
    }
}

vocabulary! {
    /// 评测中记录的主观难度
    Difficulty ("difficulty") {
        VeryEasy => "Very Easy",
        Easy => "Easy",
        Normal => "Normal",
        Hard => "Hard",
        VeryHard => "Very Hard",
    }
}

/// 第三方（IGDB、MobyGames）类型名称关键词表，按顺序取第一个匹配
const GENRE_KEYWORDS: &[(&str, Genre)] = &[
    ("role-playing", Genre::Rpg),
    ("rpg", Genre::Rpg),
    ("shooter", Genre::Shooter),
    ("platform", Genre::Platformer),
    ("racing", Genre::Racing),
    ("driving", Genre::Racing),
    ("sport", Genre::Sports),
    ("strateg", Genre::Strategy),
    ("tactic", Genre::Strategy),
    ("moba", Genre::Strategy),
    ("simulat", Genre::Simulation),
    ("puzzle", Genre::Puzzle),
    ("horror", Genre::Horror),
    ("survival", Genre::Survival),
    ("indie", Genre::Indie),
    ("multiplayer", Genre::Multiplayer),
    ("mmo", Genre::Multiplayer),
    ("adventure", Genre::Adventure),
    ("point-and-click", Genre::Adventure),
    ("visual novel", Genre::Adventure),
    ("action", Genre::Action),
    ("fighting", Genre::Action),
    ("hack and slash", Genre::Action),
];

/// 第三方平台名称关键词表。移动端与掌机条目排在前面，
/// 避免被更宽泛的 PC 与主机关键词误匹配。
const PLATFORM_KEYWORDS: &[(&str, Platform)] = &[
    ("iphone", Platform::Mobile),
    ("ipad", Platform::Mobile),
    ("ios", Platform::Mobile),
    ("android", Platform::Mobile),
    ("windows phone", Platform::Mobile),
    ("mobile", Platform::Mobile),
    ("nintendo ds", Platform::HandheldConsole),
    ("3ds", Platform::HandheldConsole),
    ("game boy", Platform::HandheldConsole),
    ("playstation portable", Platform::HandheldConsole),
    ("psp", Platform::HandheldConsole),
    ("vita", Platform::HandheldConsole),
    ("switch", Platform::HandheldConsole),
    ("game gear", Platform::HandheldConsole),
    ("lynx", Platform::HandheldConsole),
    ("neo geo pocket", Platform::HandheldConsole),
    ("wonderswan", Platform::HandheldConsole),
    ("windows", Platform::Pc),
    ("linux", Platform::Pc),
    ("mac", Platform::Pc),
    ("dos", Platform::Pc),
    ("playstation", Platform::HomeConsole),
    ("xbox", Platform::HomeConsole),
    ("wii", Platform::HomeConsole),
    ("gamecube", Platform::HomeConsole),
    ("nintendo 64", Platform::HomeConsole),
    ("nintendo entertainment system", Platform::HomeConsole),
    ("snes", Platform::HomeConsole),
    ("nes", Platform::HomeConsole),
    ("genesis", Platform::HomeConsole),
    ("mega drive", Platform::HomeConsole),
    ("saturn", Platform::HomeConsole),
    ("dreamcast", Platform::HomeConsole),
    ("atari", Platform::HomeConsole),
];

impl Genre {
    /// 将第三方类型名称映射到词表，无匹配时为 `Other`
    pub fn from_provider_name(name: &str) -> Genre {
        if let Ok(genre) = name.parse() {
            return genre;
        }
        let lower = name.trim().to_lowercase();
        GENRE_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, genre)| *genre)
            .unwrap_or(Genre::Other)
    }
}

impl Platform {
    /// 将第三方平台名称映射到词表，无匹配时为 `Other`
    pub fn from_provider_name(name: &str) -> Platform {
        if let Ok(platform) = name.parse() {
            return platform;
        }
        let lower = name.trim().to_lowercase();
        if lower == "pc" || lower.starts_with("pc ") {
            return Platform::Pc;
        }
        PLATFORM_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, platform)| *platform)
            .unwrap_or(Platform::Other)
    }
}
