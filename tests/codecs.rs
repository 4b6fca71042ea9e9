use std::path::PathBuf;

use mf6_input::{
    Column, ErrorKind, FileInout, Keystring, LineReader, List, ParamSpec, Record, Scalar,
    ScalarKind, Value,
};
use rstest::rstest;

#[rstest]
#[case(ParamSpec::keyword("save_flows"), "  SAVE_FLOWS\n", Scalar::Keyword(true))]
#[case(ParamSpec::integer("nlay"), "  NLAY 3\n", Scalar::Integer(3))]
#[case(ParamSpec::double("hclose"), "  HCLOSE 1.0d-6\n", Scalar::Double(1.0e-6))]
#[case(ParamSpec::double("rclose"), "  rclose 10\n", Scalar::Double(10.0))]
#[case(ParamSpec::string("length_units"), "LENGTH_UNITS feet\n", Scalar::String("feet".into()))]
#[case(
    ParamSpec::filename("budget"),
    "BUDGET FILEOUT gwf.cbc\n",
    Scalar::Filename { inout: FileInout::FileOut, path: PathBuf::from("gwf.cbc") }
)]
fn scalar_lines(#[case] spec: ParamSpec, #[case] text: &str, #[case] expected: Scalar) {
    let mut reader = LineReader::from_text(text);
    assert_eq!(Scalar::load(&mut reader, &spec).unwrap(), expected);
}

#[rstest]
#[case(ParamSpec::integer("nlay"), "NLAY\n", ErrorKind::Format)]
#[case(ParamSpec::integer("nlay"), "NLAY 3 4\n", ErrorKind::Format)]
#[case(ParamSpec::integer("nlay"), "NLAY three\n", ErrorKind::Parse)]
#[case(ParamSpec::integer("nlay"), "NROW 3\n", ErrorKind::Format)]
#[case(ParamSpec::filename("head"), "HEAD OUT a.hds\n", ErrorKind::Format)]
#[case(ParamSpec::double("hclose"), "", ErrorKind::UnexpectedEof)]
fn scalar_failures(#[case] spec: ParamSpec, #[case] text: &str, #[case] kind: ErrorKind) {
    let mut reader = LineReader::from_text(text);
    assert_eq!(Scalar::load(&mut reader, &spec).unwrap_err().kind, kind);
}

#[rstest]
fn untagged_scalar_is_a_bare_value() {
    let scalar = Scalar::parse_tokens(&["2.5"], ScalarKind::Double, "q", false).unwrap();
    assert_eq!(scalar.as_double(), Some(2.5));
    assert_eq!(ScalarKind::Filename.width(true), 3);
    assert_eq!(ScalarKind::Keyword.width(false), 1);
}

fn budget_spec() -> ParamSpec {
    ParamSpec::record(
        "budget",
        vec![
            ParamSpec::keyword("fileout"),
            ParamSpec::string("budgetfile").with_tagged(false),
        ],
    )
}

#[rstest]
fn record_reads_members_in_order() {
    let mut reader = LineReader::from_text("  # budget output\n  BUDGET FILEOUT model.cbc\n");
    let record = Record::load(&mut reader, &budget_spec()).unwrap();
    assert_eq!(record.get("fileout"), Some(&Scalar::Keyword(true)));
    assert_eq!(record.get("budgetfile").and_then(Scalar::as_str), Some("model.cbc"));
}

#[rstest]
fn record_with_tagged_numbers() {
    let spec = ParamSpec::record(
        "ats",
        vec![
            ParamSpec::integer("iper").with_tagged(false),
            ParamSpec::double("dt0"),
            ParamSpec::double("dtmin").with_optional(true),
        ],
    );
    let record = Record::parse_tokens(&["ATS", "2", "DT0", "0.5"], &spec).unwrap();
    assert_eq!(record.get("iper").and_then(Scalar::as_integer), Some(2));
    assert_eq!(record.get("dt0").and_then(Scalar::as_double), Some(0.5));
    assert_eq!(record.get("dtmin"), None);
}

#[rstest]
#[case(&["BUDGET"], ErrorKind::Format)]
#[case(&["HEAD", "FILEOUT", "a"], ErrorKind::Format)]
#[case(&["BUDGET", "FILEOUT", "a", "b"], ErrorKind::Format)]
fn record_failures(#[case] tokens: &[&str], #[case] kind: ErrorKind) {
    assert_eq!(Record::parse_tokens(tokens, &budget_spec()).unwrap_err().kind, kind);
}

fn solver_spec() -> ParamSpec {
    ParamSpec::keystring(
        "linear_acceleration",
        vec![
            ParamSpec::keyword("cg"),
            ParamSpec::keyword("bicgstab"),
            ParamSpec::double("relaxation_factor"),
        ],
    )
    .with_block("linear")
}

#[rstest]
fn keystring_stops_at_blank_line() {
    let text = "  CG\n  RELAXATION_FACTOR 0.97\n\n  INNER_MAXIMUM 10\n";
    let mut reader = LineReader::from_text(text);
    let keystring = Keystring::load(&mut reader, &solver_spec()).unwrap();
    assert_eq!(keystring.len(), 2);
    assert_eq!(keystring.get("cg").and_then(Value::as_scalar), Some(&Scalar::Keyword(true)));
    assert_eq!(keystring.get("relaxation_factor").and_then(Value::as_double), Some(0.97));
    assert_eq!(reader.read_content_line().unwrap().as_deref(), Some("  INNER_MAXIMUM 10"));
}

#[rstest]
fn keystring_stops_at_block_end() {
    let mut reader = LineReader::from_text("  BICGSTAB\nEND LINEAR\n");
    let keystring = Keystring::load(&mut reader, &solver_spec()).unwrap();
    assert_eq!(keystring.len(), 1);
    assert_eq!(reader.read_content_line().unwrap().as_deref(), Some("END LINEAR"));
}

#[rstest]
#[case("  CG\n  CG\n\n", ErrorKind::Cardinality)]
#[case("  CG\n  GMRES\n\n", ErrorKind::UnrecognizedParameter)]
#[case("  CG\n", ErrorKind::UnexpectedEof)]
fn keystring_failures(#[case] text: &str, #[case] kind: ErrorKind) {
    let mut reader = LineReader::from_text(text);
    assert_eq!(Keystring::load(&mut reader, &solver_spec()).unwrap_err().kind, kind);
}

fn wel_spec() -> ParamSpec {
    ParamSpec::list(
        "stress_period_data",
        vec![
            ParamSpec::integer("layer"),
            ParamSpec::integer("cell"),
            ParamSpec::double("q"),
            ParamSpec::string("boundname"),
        ],
    )
}

#[rstest]
fn list_rows_become_typed_columns() {
    let text = "  1 10 -100.0 well_a\n  # second well\n  2 20 -50 well_b\nEND PERIOD\n";
    let mut reader = LineReader::from_text(text);
    let list = List::load(&mut reader, &wel_spec(), None).unwrap();
    assert_eq!(list.rows(), 2);
    assert!(matches!(
        list.column("LAYER"),
        Some(Column::Numeric { kind: ScalarKind::Integer, .. })
    ));
    let q = list.column("q").and_then(Column::as_array).unwrap();
    assert_eq!(q.sum(), -150.0);
    assert_eq!(
        list.column("boundname").and_then(|column| column.get(1)),
        Some(Scalar::String("well_b".into()))
    );
    assert_eq!(reader.read_content_line().unwrap().as_deref(), Some("END PERIOD"));
}

#[rstest]
#[case("  1 10 -100.0\nEND PERIOD\n", None, ErrorKind::Format)]
#[case("  1 x -100.0 a\nEND PERIOD\n", None, ErrorKind::Parse)]
#[case("  1 1 1.0 a\n  2 2 2.0 b\nEND PERIOD\n", Some(1), ErrorKind::Cardinality)]
#[case("  1 1 1.0 a\n", None, ErrorKind::UnexpectedEof)]
fn list_failures(
    #[case] text: &str,
    #[case] max_rows: Option<usize>,
    #[case] kind: ErrorKind,
) {
    let mut reader = LineReader::from_text(text);
    let err = List::load(&mut reader, &wel_spec(), max_rows).unwrap_err();
    assert_eq!(err.kind, kind);
}

#[rstest]
fn empty_list_has_no_rows() {
    let mut reader = LineReader::from_text("END PERIOD\n");
    let list = List::load(&mut reader, &wel_spec(), Some(0)).unwrap();
    assert_eq!(list.rows(), 0);
    assert_eq!(list.row(0), None);
}
