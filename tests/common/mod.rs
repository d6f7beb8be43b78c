#![allow(dead_code)]

use ini_bindr::{Document, IniBind, IniEnum, KeyValueCollection, Section};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IniEnum)]
pub enum TestEnum {
    One,
    Two,
    Three,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IniEnum)]
pub enum Level {
    Debug,
    #[default]
    Info,
    #[ini(rename = "warning")]
    Warn,
}

pub const ARRAY_SAMPLE: &[(&str, &str)] = &[
    ("enums", "One,two"),
    ("enums2", "*"),
    ("strings", "hello, world"),
    ("ints", "1,2,3,asd,4"),
];

#[derive(Debug, Default, IniBind)]
pub struct ArrayContainer {
    #[config_property(name = "enums")]
    pub enums: Vec<TestEnum>,

    #[config_property(name = "enums2")]
    pub enums2: Vec<TestEnum>,

    #[config_property(name = "strings")]
    pub strings: Vec<String>,

    #[config_property(name = "ints")]
    pub ints: Vec<i32>,
}

#[derive(Debug, Default, IniBind)]
pub struct SectionWithKey {
    #[ini_key]
    pub section_name: String,

    #[config_property(name = "OtherValue", default = "aasd")]
    pub other_value: String,
}

#[derive(Debug, Default, Clone, PartialEq, IniBind)]
#[ini(section = "server")]
pub struct ServerConfig {
    #[data_member(required)]
    pub host: String,

    #[config_property(name = "Port", default = 8080)]
    pub port: u16,

    #[data_member(name = "log_level")]
    pub level: Level,

    #[config_property(name = "timeout")]
    pub timeout: Option<u32>,

    // Not bound: never read or written
    pub cache: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, IniBind)]
pub struct Globals {
    #[data_member]
    pub name: String,

    #[config_property(name = "debug", default = false)]
    pub debug: bool,
}

#[derive(Debug, Default, Clone, PartialEq, IniBind)]
pub struct Peer {
    #[ini_key]
    pub id: u32,

    #[data_member(name = "address", required)]
    pub address: String,

    #[config_property(name = "levels")]
    pub levels: Vec<Level>,
}

pub fn keys(pairs: &[(&str, &str)]) -> KeyValueCollection {
    pairs.iter().copied().collect()
}

pub fn document(global: &[(&str, &str)], sections: &[(&str, &[(&str, &str)])]) -> Document {
    let mut doc = Document::new();
    doc.global_mut().extend(global.iter().copied());
    for (name, pairs) in sections {
        doc.insert_section(Section::with_keys(*name, keys(pairs)));
    }
    doc
}

#[derive(Debug, Default, IniBind)]
#[ini(section = "features")]
pub struct Features {
    #[data_member(required)]
    pub levels: Vec<Level>,

    #[config_property(name = "fallback", default = vec![Level::Info])]
    pub fallback: Vec<Level>,
}

#[derive(Debug, Default, IniBind)]
pub struct ExplicitFlags {
    #[data_member(required = false)]
    pub host: String,

    #[config_property(name = "port", required = false, default = 80)]
    pub port: u16,

    #[data_member(name = "id", required = true)]
    pub id: String,
}

#[derive(Debug, Default, IniBind)]
#[ini(section = "raw")]
pub struct RawNames {
    #[data_member]
    pub r#type: String,

    #[config_property(name = "dir", default = "/var/lib/app")]
    pub dir: PathBuf,
}

#[derive(Debug, Default, IniBind)]
pub struct BothStyles {
    #[data_member]
    #[config_property(name = "HostName", default = "fallback")]
    pub host: String,
}
