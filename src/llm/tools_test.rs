use std::collections::HashSet;

use super::*;

#[test]
fn tools_cover_the_llm_vocabulary() {
    let tools = operation_tools();
    let offered: Vec<&str> =
        OperationName::ALL.iter().filter(|op| op.offered_to_llm()).map(|op| op.as_str()).collect();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, offered);
    assert!(names.contains(&"createStickyNote"));
    assert!(names.contains(&"arrangeInGrid"));
    assert!(names.contains(&"summarizeBoard"));
}

#[test]
fn tool_names_are_unique() {
    let tools = operation_tools();
    let names: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names.len(), tools.len());
}

#[test]
fn local_only_operations_are_not_tools() {
    let tools = operation_tools();
    for name in ["undo", "redo", "selectAll", "deselect", "zoomBy", "moveSelection"] {
        assert!(!tools.iter().any(|t| t.name == name), "{name} should not be offered");
    }
}

#[test]
fn schema_shape_is_object() {
    for tool in operation_tools() {
        assert_eq!(
            tool.input_schema.get("type").and_then(|v| v.as_str()),
            Some("object"),
            "tool {} schema should be type=object",
            tool.name
        );
        assert!(tool.input_schema["required"].is_array());
        assert!(!tool.description.is_empty());
    }
}

#[test]
fn required_fields_are_declared_properties() {
    for tool in operation_tools() {
        let props = &tool.input_schema["properties"];
        for field in tool.input_schema["required"].as_array().unwrap() {
            let field = field.as_str().unwrap();
            assert!(props.get(field).is_some(), "{}: required {field} missing", tool.name);
        }
    }
}
