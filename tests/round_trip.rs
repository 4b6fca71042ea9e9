use mf6_input::{
    load_str, to_string, to_string_with_options, to_writer, Dim, Document, How, Indent,
    LayerValue, ParamSpec, Scalar, SpecTable, Value, WriteOptions,
};
use rstest::rstest;

fn table() -> SpecTable {
    SpecTable::new()
        .with("options", ParamSpec::keyword("save_flows"))
        .with("options", ParamSpec::keyword("print_input"))
        .with(
            "options",
            ParamSpec::filename("head").with_optional(true),
        )
        .with(
            "options",
            ParamSpec::record(
                "budget",
                vec![
                    ParamSpec::keyword("fileout"),
                    ParamSpec::string("budgetfile").with_tagged(false),
                ],
            )
            .with_optional(true),
        )
        .with(
            "options",
            ParamSpec::keystring(
                "rewet",
                vec![ParamSpec::double("wetfct"), ParamSpec::integer("iwetit")],
            )
            .with_optional(true),
        )
        .with("dimensions", ParamSpec::integer("nlay"))
        .with("dimensions", ParamSpec::integer("ncpl"))
        .with("griddata", ParamSpec::array("top", [Dim::named("ncpl")]))
        .with(
            "griddata",
            ParamSpec::array("botm", [Dim::named("nlay"), Dim::named("ncpl")]).with_layered(true),
        )
        .with(
            "period",
            ParamSpec::list(
                "stress_period_data",
                vec![ParamSpec::integer("cellid"), ParamSpec::double("q")],
            ),
        )
}

const MODEL: &str = "\
BEGIN OPTIONS
  SAVE_FLOWS
  HEAD FILEOUT model.hds
  BUDGET FILEOUT model.cbc
  WETFCT 1.5
  IWETIT 2

END OPTIONS

BEGIN DIMENSIONS
  NLAY 2
  NCPL 4
END DIMENSIONS

BEGIN GRIDDATA
  TOP
    INTERNAL FACTOR 0.5 IPRN 1
      10.0 20.0 30.0 40.0
  BOTM LAYERED
    CONSTANT -5.0
    INTERNAL
      -10.0 -11.0 -12.0 -13.0
END GRIDDATA

BEGIN PERIOD 1
  1  -100.0
  3  50.0
END PERIOD 1
";

fn load(text: &str) -> Document {
    load_str(text, &table(), ".").unwrap()
}

#[rstest]
fn canonical_text_is_a_fixed_point() {
    let written = to_string(&load(MODEL));
    assert_eq!(written, MODEL);
    assert_eq!(to_string(&load(&written)), written);
}

#[rstest]
fn reloaded_document_is_equal() {
    let doc = load(MODEL);
    assert_eq!(load(&to_string(&doc)), doc);
}

#[rstest]
fn edits_survive_a_round_trip() {
    let mut doc = load(MODEL);
    let botm = doc
        .get_mut("griddata", "botm")
        .and_then(Value::as_array_mut)
        .unwrap();
    botm.set(&[0, 2], -6.0).unwrap();
    assert_eq!(
        botm.how(),
        LayerValue::Layered(vec![How::Internal, How::Internal])
    );
    let top = doc
        .get_mut("griddata", "top")
        .and_then(Value::as_array_mut)
        .unwrap();
    top.fill(7.0).unwrap();
    assert_eq!(top.how(), LayerValue::Single(How::Constant));
    doc.block_mut("options")
        .unwrap()
        .insert("print_input", Scalar::Keyword(true));

    let written = to_string(&doc);
    assert!(written.contains("  PRINT_INPUT\n"));
    assert!(written.contains("    CONSTANT 7.0 FACTOR 0.5 IPRN 1\n"));
    assert!(written.contains("      -5.0 -5.0 -6.0 -5.0\n"));
    let reloaded = load(&written);
    assert_eq!(reloaded, doc);
    assert_eq!(
        reloaded.get("griddata", "top").and_then(Value::as_array).map(|a| a.sum()),
        Some(14.0)
    );
}

#[rstest]
fn indentation_does_not_change_meaning() {
    let doc = load(MODEL);
    let options = WriteOptions::default()
        .with_indent(Indent::spaces(4))
        .with_values_per_line(Some(1));
    let written = to_string_with_options(&doc, &options);
    assert!(written.contains("\n            10.0\n"));
    assert_eq!(load(&written), doc);
}

#[rstest]
fn writer_output_matches_string_output() {
    let doc = load(MODEL);
    let mut bytes = Vec::new();
    to_writer(&mut bytes, &doc).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), to_string(&doc));
}

#[rstest]
fn nan_cells_survive_a_round_trip() {
    let mut doc = load(MODEL);
    let top = doc
        .get_mut("griddata", "top")
        .and_then(Value::as_array_mut)
        .unwrap();
    top.set(&[1], f64::NAN).unwrap();

    let written = to_string(&doc);
    assert!(written.contains("      10.0 NaN 30.0 40.0\n"));
    let reloaded = load(&written);
    assert_eq!(to_string(&reloaded), written);
    let top = reloaded.get("griddata", "top").and_then(Value::as_array).unwrap();
    assert!(top.get(&[1]).is_some_and(f64::is_nan));
    assert_eq!(top.sum(), 40.0);

    let one_per_line = WriteOptions::default().with_values_per_line(Some(1));
    let written = to_string_with_options(&doc, &one_per_line);
    assert!(written.contains("\n      NaN\n"));
    let reloaded = load(&written);
    assert!(reloaded
        .get("griddata", "top")
        .and_then(Value::as_array)
        .and_then(|top| top.get(&[1]))
        .is_some_and(f64::is_nan));
}
