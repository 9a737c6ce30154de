use nnd_common::serde::{self, Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct Rule34Post {
    pub id: u64,
    pub file_url: Option<String>,
    /// Original file name, the extension is taken from here.
    pub image: Option<String>,
    /// Space separated tag list.
    #[serde(default)]
    pub tags: String,
}
