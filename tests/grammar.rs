use mf6_input::{parse_str, to_json, ErrorKind, ParseOptions, Scalar, Value};
use rstest::rstest;
use serde_json::json;

fn options() -> ParseOptions {
    ParseOptions::new().with_list_blocks(["period"])
}

#[rstest]
fn options_block_to_json() {
    let text = "\
# model options
BEGIN OPTIONS
  SAVE_FLOWS            ! keep budgets
  HEAD FILEOUT model.hds
  LENGTH_UNITS meters   // metric
  HCLOSE 1.0d-6
  MAXITER 50
END OPTIONS
";
    let doc = parse_str(text, &options()).unwrap();
    assert_eq!(
        to_json(&doc).unwrap(),
        json!({
            "blocks": [{
                "name": "options",
                "params": {
                    "save_flows": true,
                    "head": {"inout": "fileout", "path": "model.hds"},
                    "length_units": "meters",
                    "hclose": 1.0e-6,
                    "maxiter": 50
                }
            }]
        })
    );
}

#[rstest]
fn griddata_constant_to_json() {
    let text = "BEGIN GRIDDATA\n  STRT\n    CONSTANT 10.0\nEND GRIDDATA\n";
    let doc = parse_str(text, &options()).unwrap();
    assert_eq!(
        to_json(&doc).unwrap(),
        json!({
            "blocks": [{
                "name": "griddata",
                "params": {
                    "strt": {
                        "shape": [],
                        "how": "constant",
                        "factor": 1.0,
                        "path": null,
                        "raw": [10.0]
                    }
                }
            }]
        })
    );
}

#[rstest]
fn commas_are_whitespace() {
    let text = "BEGIN GRIDDATA\n  K\n    INTERNAL FACTOR 1.5\n      1.0, 2.0,3.0\n      4.0 ,5.0\nEND GRIDDATA\n";
    let doc = parse_str(text, &options()).unwrap();
    let k = doc.get("griddata", "k").and_then(Value::as_array).unwrap();
    assert_eq!(k.len(), 5);
    assert_eq!(k.sum(), 22.5);
}

#[rstest]
fn period_blocks_keep_index_and_order() {
    let text = "\
BEGIN PERIOD 1
  1 1 1 -100.0
  1 2 3 -50.0
END PERIOD

BEGIN PERIOD 3
  2 2 2 -25.0
END PERIOD 3
";
    let doc = parse_str(text, &options()).unwrap();
    let indices: Vec<Option<usize>> = doc.blocks_named("period").map(|b| b.index).collect();
    assert_eq!(indices, vec![Some(1), Some(3)]);
    let list = doc.blocks[0].get("period").and_then(Value::as_list).unwrap();
    assert_eq!(list.rows(), 2);
    assert_eq!(
        list.row(1),
        Some(vec![
            Scalar::Integer(1),
            Scalar::Integer(2),
            Scalar::Integer(3),
            Scalar::Double(-50.0)
        ])
    );
}

#[rstest]
fn blank_and_comment_lines_between_blocks() {
    let text = "\n\n# header\n\nBEGIN A\n\n  # inside\n  X 1\n\nEND A\n\n! trailing\n";
    let doc = parse_str(text, &options()).unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.get("a", "x").and_then(Value::as_integer), Some(1));
}

#[rstest]
#[case("BEGIN OPTIONS\n  SAVE_FLOWS\n", ErrorKind::UnexpectedEof)]
#[case("BEGIN GRIDDATA\n  K\n    INTERNAL\n      1 2\n", ErrorKind::UnexpectedEof)]
#[case("BEGIN GRIDDATA\n  K INTERNAL FACTOR\nEND GRIDDATA\n", ErrorKind::Format)]
#[case("BEGIN GRIDDATA\n  K INTERNAL\n    1 2 3.4.5\nEND GRIDDATA\n", ErrorKind::Parse)]
#[case("BEGIN GRIDDATA\n  K CONSTANT abc\nEND GRIDDATA\n", ErrorKind::Parse)]
#[case("BEGIN GRIDDATA\n  K OPEN/CLOSE\nEND GRIDDATA\n", ErrorKind::Format)]
#[case("BEGIN GRIDDATA\n  K LAYERED\nEND GRIDDATA\n", ErrorKind::Format)]
#[case("BEGIN OPTIONS\nEND GRIDDATA\n", ErrorKind::Format)]
#[case("BEGIN PERIOD 1\n  1 2\nEND PERIOD 2\n", ErrorKind::Format)]
#[case("BEGIN PERIOD 1\n  1 2\n  3\nEND PERIOD\n", ErrorKind::Cardinality)]
#[case("SAVE_FLOWS\n", ErrorKind::Format)]
fn parse_failures(#[case] text: &str, #[case] kind: ErrorKind) {
    let err = parse_str(text, &options()).unwrap_err();
    assert_eq!(err.kind, kind, "{err}");
}

#[rstest]
fn errors_carry_line_numbers() {
    let text = "BEGIN GRIDDATA\n  K\n    INTERNAL\n      1 2\n      3 4..\nEND GRIDDATA\n";
    let err = parse_str(text, &options()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert_eq!(err.location.map(|l| l.line), Some(5));
}

#[rstest]
fn unknown_block_with_allow_list() {
    let options = ParseOptions::new().with_param_blocks(["options", "dimensions"]);
    let err = parse_str("BEGIN GRIDDATA\nEND GRIDDATA\n", &options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownBlock);
}

#[rstest]
fn many_documents_keep_input_order() {
    let inputs: Vec<String> = (1..=4)
        .map(|n| format!("BEGIN DIMENSIONS\n  NLAY {n}\nEND DIMENSIONS\n"))
        .chain(std::iter::once("BEGIN DIMENSIONS\n".to_string()))
        .collect();
    let results = mf6_input::parse_documents(&inputs, &options());
    assert_eq!(results.len(), 5);
    for (ix, result) in results.iter().take(4).enumerate() {
        let doc = result.as_ref().unwrap();
        assert_eq!(
            doc.get("dimensions", "nlay").and_then(Value::as_integer),
            Some(ix as i64 + 1)
        );
    }
    assert_eq!(
        results[4].as_ref().unwrap_err().kind,
        ErrorKind::UnexpectedEof
    );
}

#[rstest]
fn bare_key_before_unknown_directive_reads_as_two_params() {
    let text = "BEGIN GRIDDATA\n  STRT\n    REPLICATE 10.0\nEND GRIDDATA\n";
    let doc = parse_str(text, &options()).unwrap();
    let block = doc.block("griddata").unwrap();
    assert_eq!(block.get("strt"), Some(&Value::Scalar(Scalar::Keyword(true))));
    assert_eq!(block.get("replicate").and_then(Value::as_double), Some(10.0));
}
