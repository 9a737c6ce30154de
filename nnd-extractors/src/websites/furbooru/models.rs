use nnd_common::serde::{self, Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde")]
pub struct FurbooruTopLevel {
    #[serde(default)]
    pub images: Vec<FurbooruImage>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct FurbooruImage {
    pub id: u64,
    pub format: Option<String>,
    #[serde(default)]
    pub hidden_from_users: bool,
    #[serde(default)]
    pub representations: Representations,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Representations {
    pub full: Option<String>,
}
