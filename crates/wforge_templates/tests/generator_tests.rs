//! Integration tests for widget package generation.

use std::fs;

use tempfile::tempdir;
use wforge_spec::{Property, PropertyType, WidgetConfig, WidgetEvent};
use wforge_templates::{GenerateMode, WidgetGenerator, MANIFEST_FILE, STANDARD_SCRIPTS};

fn list_widget() -> WidgetConfig {
    WidgetConfig::new("task-list")
        .with_description("Lists tasks")
        .with_company("acme.widgets")
        .with_property(Property::new("tasks", PropertyType::Datasource).required())
        .with_property(Property::new("title", PropertyType::Attribute).linked_to("tasks"))
        .with_property(Property::new("onOpen", PropertyType::Action).linked_to("tasks"))
        .with_property(Property::new("threshold", PropertyType::Decimal))
        .with_event(WidgetEvent::new("onRefresh"))
}

#[test]
fn test_generated_package_layout() {
    let dir = tempdir().unwrap();
    let result = WidgetGenerator::new()
        .generate(&list_widget(), dir.path(), GenerateMode::Fresh)
        .unwrap();

    for expected in [
        "package.json",
        "tsconfig.json",
        "src/package.xml",
        "src/TaskList.xml",
        "src/TaskList.tsx",
        "src/TaskList.editorConfig.ts",
        "src/ui/TaskList.css",
        "typings/TaskListProps.d.ts",
    ] {
        assert!(dir.path().join(expected).is_file(), "missing {}", expected);
    }
    assert_eq!(result.all_files().count(), result.written.len());
}

#[test]
fn test_manifest_is_valid_json_with_scripts() {
    let dir = tempdir().unwrap();
    WidgetGenerator::new()
        .generate(&list_widget(), dir.path(), GenerateMode::Fresh)
        .unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest["name"], "tasklist");
    assert_eq!(manifest["packagePath"], "acme.widgets");
    for (name, _) in STANDARD_SCRIPTS {
        assert!(manifest["scripts"][name].is_string(), "script {} missing", name);
    }
}

#[test]
fn test_linked_properties_in_xml_and_typings() {
    let dir = tempdir().unwrap();
    WidgetGenerator::new()
        .generate(&list_widget(), dir.path(), GenerateMode::Fresh)
        .unwrap();

    let xml = fs::read_to_string(dir.path().join("src/TaskList.xml")).unwrap();
    assert!(xml.contains("id=\"acme.widgets.tasklist.TaskList\""));
    assert!(xml.contains("key=\"tasks\" type=\"datasource\" isList=\"true\" required=\"true\""));
    assert!(xml.contains("dataSource=\"tasks\""));

    let package_xml = fs::read_to_string(dir.path().join("src/package.xml")).unwrap();
    assert!(package_xml.contains("<file path=\"acme/widgets/tasklist\"/>"));

    let typings = fs::read_to_string(dir.path().join("typings/TaskListProps.d.ts")).unwrap();
    assert!(typings.contains("tasks: ListValue;"));
    assert!(typings.contains("title?: ListAttributeValue<string>;"));
    assert!(typings.contains("onOpen?: ListActionValue;"));
    assert!(typings.contains("import { Big } from \"big.js\";"));
    assert!(typings.contains("onRefresh?: ActionValue;"));
}
