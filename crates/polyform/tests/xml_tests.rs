use polyform::{
    format_xml, is_valid_xml, minify_xml, value_to_xml, xml_to_value, Value,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn as_json(value: &Value) -> String {
    polyform::convert::serialize(value, polyform::Format::Json).unwrap_or_default()
}

#[test]
fn attribute_and_text_map_to_object() -> TestResult {
    let value = xml_to_value("<a x=\"1\">hi</a>")?;
    assert_eq!(as_json(&value), r##"{"a":{"@x":"1","#text":"hi"}}"##);
    Ok(())
}

#[test]
fn bare_text_collapses() -> TestResult {
    let value = xml_to_value("<a>hi</a>")?;
    assert_eq!(as_json(&value), r#"{"a":"hi"}"#);
    Ok(())
}

#[test]
fn repeated_tags_become_array() -> TestResult {
    let value = xml_to_value("<a><b>1</b><b>2</b></a>")?;
    assert_eq!(as_json(&value), r#"{"a":{"b":["1","2"]}}"#);
    Ok(())
}

#[test]
fn array_converts_back_to_siblings() -> TestResult {
    let value = xml_to_value("<a><b>1</b><b>2</b></a>")?;
    let xml = value_to_xml(&value, "root");
    assert!(xml.ends_with("<a><b>1</b><b>2</b></a>"));
    Ok(())
}

#[test]
fn empty_elements_map_to_empty_object() -> TestResult {
    for input in ["<a/>", "<a></a>"] {
        let value = xml_to_value(input)?;
        assert_eq!(as_json(&value), r#"{"a":{}}"#, "input: {input}");
    }
    Ok(())
}

#[test]
fn no_type_coercion_happens() -> TestResult {
    let value = xml_to_value("<a><n>42</n><b>true</b></a>")?;
    assert_eq!(as_json(&value), r#"{"a":{"n":"42","b":"true"}}"#);
    Ok(())
}

#[test]
fn minify_collapses_inter_tag_whitespace() {
    assert_eq!(minify_xml("<a>\n  <b/>\n</a>"), "<a><b/></a>");
}

#[test]
fn validity_check_rejects_empty_and_malformed() {
    assert!(!is_valid_xml(""));
    assert!(!is_valid_xml("   "));
    assert!(!is_valid_xml("<a><b></a>"));
    assert!(is_valid_xml("<a><b></b></a>"));
}

#[test]
fn output_starts_with_declaration() -> TestResult {
    let value = xml_to_value("<a>hi</a>")?;
    let xml = value_to_xml(&value, "root");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    Ok(())
}

#[test]
fn roundtrip_is_a_fixpoint_after_one_pass() -> TestResult {
    let documents = [
        "<a>hi</a>",
        "<a x=\"1\">hi</a>",
        "<a><b>1</b><b>2</b></a>",
        "<a>one<b>mid</b>two</a>",
        "<library><book id=\"1\"><title>Dune</title></book>\
         <book id=\"2\"><title>Foundation</title></book></library>",
    ];
    for doc in documents {
        let first = xml_to_value(doc)?;
        let second = xml_to_value(&value_to_xml(&first, "root"))?;
        let third = xml_to_value(&value_to_xml(&second, "root"))?;
        assert_eq!(second, third, "document: {doc}");
    }
    Ok(())
}

#[test]
fn formatted_output_stays_valid_and_equivalent() -> TestResult {
    let input = "<?xml version=\"1.0\"?><library><book id=\"1\">\
                 <title>Dune &amp; more</title></book><shelf/></library>";
    let formatted = format_xml(input)?;
    assert!(is_valid_xml(&formatted));
    assert_eq!(xml_to_value(input)?, xml_to_value(&formatted)?);
    assert!(formatted.starts_with("<?xml version=\"1.0\"?>\n"));
    Ok(())
}

#[test]
fn minified_output_stays_equivalent() -> TestResult {
    let input = "<library>\n  <book>\n    <title>Dune</title>\n  </book>\n</library>";
    let minified = minify_xml(input);
    assert!(!minified.contains('\n'));
    assert_eq!(xml_to_value(input)?, xml_to_value(&minified)?);
    Ok(())
}
