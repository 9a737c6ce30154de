use nnd_common::{
    item::tags::TagMap,
    serde::{self, Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde")]
pub struct E6TopLevel {
    #[serde(default)]
    pub posts: Vec<E6Post>,
    /// Only present on errors, like the page 750 limit.
    pub message: Option<String>,
    pub success: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct E6Post {
    pub id: u64,
    pub file: E6File,
    #[serde(default)]
    pub tags: TagMap,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct E6File {
    pub ext: Option<String>,
    pub md5: Option<String>,
    pub url: Option<String>,
}
