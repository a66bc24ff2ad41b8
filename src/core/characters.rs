//! The playable roster: key → display name, welcome-screen brief, portrait path.

pub const DEFAULT_ROLE_KEY: &str = "su_tang";
pub const FALLBACK_PORTRAIT: &str = "/static/images/favicon.ico";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
    pub key: &'static str,
    pub name: &'static str,
    pub brief: &'static str,
}

pub const ROSTER: &[Character] = &[
    Character {
        key: "su_tang",
        name: "苏糖",
        brief: "在烘焙社摊位前的温柔女孩；甜点与音乐是她的安全感（初始好感度 30）。",
    },
    Character {
        key: "lin_yuhan",
        name: "林雨含",
        brief: "舞蹈社附近的气氛担当；元气直给，也会认真安慰（初始好感度 50）。",
    },
    Character {
        key: "luo_yimo",
        name: "罗一莫",
        brief: "科技协会附近的慢热同学；话不多但认真听，细节里有温度（初始好感度 35）。",
    },
    Character {
        key: "gu_pan",
        name: "顾盼",
        brief: "桌游社附近常能遇到他；会接梗也会收住，让人不尴尬（初始好感度 40）。",
    },
    Character {
        key: "xia_xingwan",
        name: "夏星晚",
        brief: "操场与网球社之间的身影；自律里有温柔，很会照顾人（初始好感度 38）。",
    },
];

pub fn find(key: &str) -> Option<&'static Character> {
    let key = key.to_lowercase();
    ROSTER.iter().find(|c| c.key == key)
}

/// Index into `ROSTER` for `key`, or 0 when unknown.
pub fn roster_index(key: &str) -> usize {
    let key = key.to_lowercase();
    ROSTER.iter().position(|c| c.key == key).unwrap_or(0)
}

/// Display name for a role key. Unknown keys get the default heroine.
pub fn display_name(key: &str) -> &'static str {
    find(key).or_else(|| find(DEFAULT_ROLE_KEY)).map_or("苏糖", |c| c.name)
}

pub fn brief(key: &str) -> Option<&'static str> {
    find(key).map(|c| c.brief)
}

/// Server path of a character's portrait image.
pub fn portrait_path(key: &str) -> String {
    format!("/static/images/{}.png", key.to_lowercase())
}

/// Portrait resolution state. A failed primary falls back once and stays there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Portrait {
    /// Probe in flight for this path.
    Pending(String),
    Loaded(String),
    Fallback,
}

impl Portrait {
    pub fn path(&self) -> &str {
        match self {
            Portrait::Pending(p) | Portrait::Loaded(p) => p,
            Portrait::Fallback => FALLBACK_PORTRAIT,
        }
    }
}
