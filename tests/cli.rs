use smilescanon::cli::run;

fn output(args: &[&str]) -> String {
    let mut argv = vec!["smilescanon"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    run(argv, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn golden_scenarios() {
    assert_eq!(output(&["CCO"]), "CCO\n");
    assert_eq!(output(&["C1=CC=CC=C1"]), "c1ccccc1\n");
    assert_eq!(output(&["notasmiles((("]), "\n");
    assert_eq!(output(&[]), "\n");
}

#[test]
fn empty_argument_matches_no_arguments() {
    assert_eq!(output(&[""]), output(&[]));
}

#[test]
fn extra_arguments_ignored() {
    assert_eq!(output(&["OCC", "c1ccccc1", "junk((("]), "CCO\n");
    assert_eq!(output(&["notasmiles(((", "CCO"]), "\n");
}

#[test]
fn flag_like_arguments_are_smiles() {
    assert_eq!(output(&["--help"]), "\n");
    assert_eq!(output(&["-V"]), "\n");
    assert_eq!(output(&["--version", "CCO"]), "\n");
}

#[test]
fn double_dash_is_an_argument() {
    assert_eq!(output(&["--", "CCO"]), "\n");
    assert_eq!(output(&["--"]), "\n");
    assert_eq!(output(&["OCC", "--"]), "CCO\n");
}

#[test]
fn output_is_one_line() {
    for smiles in ["[Na+].[Cl-]", "F/C=C/F", "CC(=O)O title text", "  OCC"] {
        let out = output(&[smiles]);
        assert_eq!(out.matches('\n').count(), 1, "{smiles}");
        assert!(out.ends_with('\n'));
    }
    assert_eq!(output(&["CC(=O)O title text"]), "CC(=O)O\n");
    assert_eq!(output(&["  OCC"]), "CCO\n");
}

#[cfg(unix)]
#[test]
fn non_utf8_argument_gives_empty_line() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let argv = vec![
        OsString::from("smilescanon"),
        OsString::from_vec(vec![0x43, 0xff, 0x43]),
    ];
    let mut out = Vec::new();
    run(argv, &mut out).unwrap();
    assert_eq!(out, b"\n");
}
