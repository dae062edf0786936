//! Contents of the generated widget package.
//!
//! Static sources are `{{variable}}` templates; the widget definition XML,
//! the props typings and the package manifest are built from the config.

use serde_json::{json, Value};
use wforge_spec::{Property, PropertyType, WidgetConfig};

/// Scripts every generated manifest carries.
pub const STANDARD_SCRIPTS: [(&str, &str); 4] = [
    ("build", "pluggable-widgets-tools build:web"),
    ("dev", "pluggable-widgets-tools start:web"),
    ("lint", "pluggable-widgets-tools lint"),
    ("release", "pluggable-widgets-tools release:web"),
];

pub const WIDGET_VERSION: &str = "1.0.0";
pub const TOOLS_VERSION: &str = "^10.0.1";

pub const COMPONENT_TSX: &str = r#"import { ReactElement, createElement } from "react";
import classNames from "classnames";

import { {{component_name}}ContainerProps } from "../typings/{{component_name}}Props";

import "./ui/{{component_name}}.css";

export function {{component_name}}(props: {{component_name}}ContainerProps): ReactElement {
    return (
        <div className={classNames("widget-{{package_name}}", props.class)} style={props.style}>
            {{display_name}}
        </div>
    );
}
"#;

pub const EDITOR_CONFIG_TS: &str = r#"import { {{component_name}}PreviewProps } from "../typings/{{component_name}}Props";

export type Properties = PropertyGroup[];

type PropertyGroup = {
    caption: string;
    propertyGroups?: PropertyGroup[];
    properties?: Property[];
};

type Property = {
    key: string;
    caption: string;
    description?: string;
};

export function getProperties(_values: {{component_name}}PreviewProps, defaultProperties: Properties): Properties {
    return defaultProperties;
}
"#;

pub const WIDGET_CSS: &str = r#".widget-{{package_name}} {
    display: inline-block;
}
"#;

pub const PACKAGE_XML: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<package xmlns="http://www.mendix.com/package/1.0/">
    <clientModule name="{{component_name}}" version="{{version}}" xmlns="http://www.mendix.com/clientModule/1.0/">
        <widgetFiles>
            <widgetFile path="{{component_name}}.xml"/>
        </widgetFiles>
        <files>
            <file path="{{company_path}}/{{package_name}}"/>
        </files>
    </clientModule>
</package>
"#;

pub const TSCONFIG_JSON: &str = r#"{
    "extends": "@mendix/pluggable-widgets-tools/configs/tsconfig.base.json",
    "compilerOptions": {
        "baseUrl": "./"
    },
    "include": ["./src", "./typings"]
}
"#;

pub const GITIGNORE: &str = "node_modules/\ndist/\n";

/// The `package.json` manifest.
pub fn package_manifest(config: &WidgetConfig) -> Value {
    let scripts: serde_json::Map<String, Value> = STANDARD_SCRIPTS
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();

    let project_path = config
        .target_project_path
        .as_ref()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|| "./tests/testProject".to_string());

    json!({
        "name": config.package_name(),
        "widgetName": config.component_name(),
        "version": WIDGET_VERSION,
        "description": config.description,
        "license": "Apache-2.0",
        "packagePath": config.company,
        "config": {
            "projectPath": project_path,
            "mendixHost": "http://localhost:8080",
            "developmentPort": 3000
        },
        "scripts": scripts,
        "devDependencies": {
            "@mendix/pluggable-widgets-tools": TOOLS_VERSION
        },
        "dependencies": {
            "classnames": "^2.3.2"
        }
    })
}

/// The widget definition XML (`src/<Component>.xml`).
pub fn widget_xml(config: &WidgetConfig) -> String {
    let id = format!(
        "{}.{}.{}",
        config.company,
        config.package_name(),
        config.component_name()
    );

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
    xml.push_str(&format!(
        "<widget id=\"{}\" pluginWidget=\"true\" offlineCapable=\"true\"\n        xmlns=\"http://www.mendix.com/widget/1.0/\">\n",
        escape(&id)
    ));
    xml.push_str(&format!("    <name>{}</name>\n", escape(config.display_name())));
    xml.push_str(&format!("    <description>{}</description>\n", escape(&config.description)));
    xml.push_str(&format!("    <studioProCategory>{}</studioProCategory>\n", escape(&config.category)));
    xml.push_str("    <properties>\n");
    xml.push_str("        <propertyGroup caption=\"General\">\n");
    xml.push_str("            <propertyGroup caption=\"General\">\n");
    for property in &config.properties {
        property_xml(&mut xml, property, "                ");
    }
    xml.push_str("            </propertyGroup>\n");
    if !config.events.is_empty() {
        xml.push_str("            <propertyGroup caption=\"Events\">\n");
        for event in &config.events {
            xml.push_str(&format!(
                "                <property key=\"{}\" type=\"action\" required=\"false\">\n",
                escape(&event.name)
            ));
            xml.push_str(&format!("                    <caption>{}</caption>\n", escape(&event.caption)));
            xml.push_str(&format!(
                "                    <description>{}</description>\n",
                escape(&event.description)
            ));
            xml.push_str("                </property>\n");
        }
        xml.push_str("            </propertyGroup>\n");
    }
    xml.push_str("        </propertyGroup>\n");
    xml.push_str("    </properties>\n");
    xml.push_str("</widget>\n");
    xml
}

fn property_xml(xml: &mut String, property: &Property, indent: &str) {
    let mut attrs = format!(
        "key=\"{}\" type=\"{}\"",
        escape(&property.key),
        property.property_type.as_str()
    );
    if matches!(property.property_type, PropertyType::Datasource | PropertyType::Object) {
        attrs.push_str(" isList=\"true\"");
    }
    if !matches!(property.property_type, PropertyType::Boolean | PropertyType::Enumeration) {
        attrs.push_str(&format!(" required=\"{}\"", property.required));
    }
    if let Some(default) = &property.default_value {
        attrs.push_str(&format!(" defaultValue=\"{}\"", escape(default)));
    } else if property.property_type == PropertyType::Boolean {
        attrs.push_str(" defaultValue=\"false\"");
    } else if let Some(first) = property.enum_values.first() {
        attrs.push_str(&format!(" defaultValue=\"{}\"", escape(&first.key)));
    }
    if let Some(source) = &property.data_source {
        attrs.push_str(&format!(" dataSource=\"{}\"", escape(source)));
    }

    xml.push_str(&format!("{}<property {}>\n", indent, attrs));
    xml.push_str(&format!("{}    <caption>{}</caption>\n", indent, escape(&property.caption)));
    xml.push_str(&format!(
        "{}    <description>{}</description>\n",
        indent,
        escape(&property.description)
    ));

    match property.property_type {
        PropertyType::Attribute => {
            xml.push_str(&format!("{}    <attributeTypes>\n", indent));
            let kinds: Vec<&str> = if property.allowed_attribute_types.is_empty() {
                vec!["String"]
            } else {
                property.allowed_attribute_types.iter().map(String::as_str).collect()
            };
            for kind in kinds {
                xml.push_str(&format!(
                    "{}        <attributeType name=\"{}\"/>\n",
                    indent,
                    escape(kind)
                ));
            }
            xml.push_str(&format!("{}    </attributeTypes>\n", indent));
        }
        PropertyType::Enumeration => {
            xml.push_str(&format!("{}    <enumerationValues>\n", indent));
            for value in &property.enum_values {
                xml.push_str(&format!(
                    "{}        <enumerationValue key=\"{}\">{}</enumerationValue>\n",
                    indent,
                    escape(&value.key),
                    escape(&value.caption)
                ));
            }
            xml.push_str(&format!("{}    </enumerationValues>\n", indent));
        }
        PropertyType::Expression => {
            xml.push_str(&format!("{}    <returnType type=\"String\"/>\n", indent));
        }
        _ => {}
    }

    xml.push_str(&format!("{}</property>\n", indent));
}

/// TypeScript props typings (`typings/<Component>Props.d.ts`).
pub fn props_typings(config: &WidgetConfig) -> String {
    let component = config.component_name();
    let mut imports: Vec<&str> = Vec::new();
    let mut container = String::new();
    let mut preview = String::new();

    for property in &config.properties {
        let (ty, import) = ts_type(property);
        if let Some(import) = import {
            if !imports.contains(&import) {
                imports.push(import);
            }
        }
        let optional = if property.required || is_always_present(property.property_type) {
            ""
        } else {
            "?"
        };
        container.push_str(&format!("    {}{}: {};\n", property.key, optional, ty));
        preview.push_str(&format!("    {}: {};\n", property.key, preview_type(property)));
    }
    for event in &config.events {
        if !imports.contains(&"ActionValue") {
            imports.push("ActionValue");
        }
        container.push_str(&format!("    {}?: ActionValue;\n", event.name));
        preview.push_str(&format!("    {}: {{}} | null;\n", event.name));
    }

    let mut out = String::from("/**\n * This file was generated from ");
    out.push_str(&format!("{}.xml\n */\n", component));
    out.push_str("import { CSSProperties } from \"react\";\n");
    if config.properties.iter().any(|p| p.property_type == PropertyType::Decimal) {
        out.push_str("import { Big } from \"big.js\";\n");
    }
    if !imports.is_empty() {
        imports.sort_unstable();
        out.push_str(&format!("import {{ {} }} from \"mendix\";\n", imports.join(", ")));
    }
    out.push('\n');
    for property in config.properties.iter().filter(|p| p.property_type == PropertyType::Enumeration) {
        let keys: Vec<String> = property.enum_values.iter().map(|v| format!("\"{}\"", v.key)).collect();
        out.push_str(&format!(
            "export type {}Enum = {};\n\n",
            pascal(&property.key),
            if keys.is_empty() { "string".to_string() } else { keys.join(" | ") }
        ));
    }
    out.push_str(&format!("export interface {}ContainerProps {{\n", component));
    out.push_str("    name: string;\n    class: string;\n    style?: CSSProperties;\n    tabIndex?: number;\n");
    out.push_str(&container);
    out.push_str("}\n\n");
    out.push_str(&format!("export interface {}PreviewProps {{\n", component));
    out.push_str("    readOnly: boolean;\n");
    out.push_str(&preview);
    out.push_str("}\n");
    out
}

fn is_always_present(ty: PropertyType) -> bool {
    matches!(
        ty,
        PropertyType::String | PropertyType::Boolean | PropertyType::Integer | PropertyType::Enumeration
    )
}

fn ts_type(property: &Property) -> (String, Option<&'static str>) {
    let linked = property.data_source.is_some();
    match property.property_type {
        PropertyType::String => ("string".into(), None),
        PropertyType::Boolean => ("boolean".into(), None),
        PropertyType::Integer => ("number".into(), None),
        PropertyType::Decimal => ("Big".into(), None),
        PropertyType::Enumeration => (format!("{}Enum", pascal(&property.key)), None),
        PropertyType::TextTemplate | PropertyType::Expression if linked => {
            ("ListExpressionValue<string>".into(), Some("ListExpressionValue"))
        }
        PropertyType::TextTemplate | PropertyType::Expression => {
            ("DynamicValue<string>".into(), Some("DynamicValue"))
        }
        PropertyType::Action if linked => ("ListActionValue".into(), Some("ListActionValue")),
        PropertyType::Action => ("ActionValue".into(), Some("ActionValue")),
        PropertyType::Attribute if linked => {
            ("ListAttributeValue<string>".into(), Some("ListAttributeValue"))
        }
        PropertyType::Attribute => ("EditableValue<string>".into(), Some("EditableValue")),
        PropertyType::Datasource => ("ListValue".into(), Some("ListValue")),
        PropertyType::Widgets if linked => ("ListWidgetValue".into(), Some("ListWidgetValue")),
        PropertyType::Widgets => ("ReactNode".into(), None),
        PropertyType::Image => ("DynamicValue<WebImage>".into(), Some("DynamicValue")),
        PropertyType::Icon => ("DynamicValue<WebIcon>".into(), Some("DynamicValue")),
        PropertyType::Association if linked => {
            ("ListReferenceValue".into(), Some("ListReferenceValue"))
        }
        PropertyType::Association => ("ReferenceValue".into(), Some("ReferenceValue")),
        PropertyType::Object => ("unknown[]".into(), None),
    }
}

fn preview_type(property: &Property) -> &'static str {
    match property.property_type {
        PropertyType::Boolean => "boolean",
        PropertyType::Integer | PropertyType::Decimal => "number | null",
        PropertyType::Action | PropertyType::Datasource => "{} | null",
        PropertyType::Widgets => "{ widgetCount: number; renderer: any }",
        PropertyType::Image | PropertyType::Icon => "{ type: string } | null",
        PropertyType::Object => "unknown[]",
        _ => "string",
    }
}

fn pascal(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
