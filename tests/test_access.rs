mod common;

use common::*;
use ini_bindr::{DeclarationStyle, IniBind, SectionStrategy};

#[test]
fn test_metadata_access() {
    let binding = ServerConfig::type_binding();

    assert_eq!(binding.type_name(), "ServerConfig");
    assert_eq!(binding.strategy(), &SectionStrategy::Fixed("server".to_string()));
    assert!(binding.key().is_none());

    let host = binding.property("host").unwrap();
    assert_eq!(host.key(), "host");
    assert!(host.is_required());
    assert_eq!(host.style(), DeclarationStyle::DataMember);

    let port = binding.property("port").unwrap();
    assert_eq!(port.key(), "Port");
    assert!(!port.is_required());
    assert_eq!(port.default_display(), Some("8080"));
    assert_eq!(port.style(), DeclarationStyle::ConfigurationProperty);

    let level = binding.find_key("LOG_LEVEL").unwrap();
    assert_eq!(level.property(), "level");
    assert!(level.kind().is_enum());
}

#[test]
fn test_unannotated_field_is_not_bound() {
    let binding = ServerConfig::type_binding();

    assert!(binding.property("cache").is_none());
    assert_eq!(binding.properties().len(), 4);
}

#[test]
fn test_declaration_order_is_kept() {
    let keys: Vec<_> = ServerConfig::type_binding()
        .properties()
        .iter()
        .map(|p| p.key())
        .collect();

    assert_eq!(keys, vec!["host", "Port", "log_level", "timeout"]);
}

#[test]
fn test_key_property_makes_strategy_dynamic() {
    let binding = SectionWithKey::type_binding();

    assert_eq!(binding.strategy(), &SectionStrategy::Dynamic);
    assert_eq!(binding.key().unwrap().property(), "section_name");
    assert!(binding.property("section_name").is_none());
    assert_eq!(
        binding.property("other_value").unwrap().default_display(),
        Some("aasd")
    );
}

#[test]
fn test_global_strategy_without_section_or_key() {
    assert_eq!(Globals::type_binding().strategy(), &SectionStrategy::Global);
    assert_eq!(ArrayContainer::type_binding().strategy(), &SectionStrategy::Global);
}

#[test]
fn test_binding_is_cached() {
    let first = Peer::type_binding() as *const _;
    let second = Peer::type_binding() as *const _;
    assert_eq!(first, second);
}

#[test]
fn test_binding_is_shared_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| Peer::type_binding().properties().len()))
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}

#[test]
fn test_markdown_docs() {
    let md = ServerConfig::type_binding().to_markdown();

    assert!(md.contains("## Section `[server]`"));
    assert!(md.contains("| Key | Required | Default | Type | Values |"));
    assert!(md.contains("| host | Yes | - | String | - |"));
    assert!(md.contains("| Port | No | 8080 | u16 | - |"));
    assert!(md.contains("| log_level | No | - | Level | Debug, Info, warning |"));
    assert!(md.contains("| timeout | No | - | Option<u32> | - |"));
}
