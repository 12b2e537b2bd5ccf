use asm465::{assemble_program, record, Artifacts};
use lib465::word::from_base4;

fn assemble_clean(source: &str) -> Artifacts {
    let assembly = assemble_program(source).expect("fatal error");
    assert!(
        !assembly.source_errors.has_errors(),
        "preprocessor errors: {:?}",
        assembly.source_errors.errors()
    );
    assert!(
        !assembly.pass_errors.has_errors(),
        "pass errors: {:?}",
        assembly.pass_errors.errors()
    );
    assembly.artifacts.expect("artifacts")
}

#[test]
fn two_register_move() {
    let artifacts = assemble_clean("MAIN: mov r3, r7\n stop\n");
    insta::assert_snapshot!(artifacts.object.to_string(), @r"
 aaad aaaa
bcba	aadda
bcbb	adbda
bcbc	ddaaa
");
    assert!(artifacts.entries.is_empty());
    assert!(artifacts.externals.is_empty());
}

#[test]
fn macro_calls_assemble_twice() {
    let source = include_str!("programs/doubler.as");
    let assembly = assemble_program(source).expect("fatal error");
    let expanded = assembly.expanded.as_deref().expect("expanded stream");
    assert_eq!(expanded.matches("add r1,r2").count(), 2);

    let artifacts = assembly.artifacts.expect("artifacts");
    insta::assert_snapshot!(artifacts.object.to_string(), @r"
 aaba aaaa
bcba	acdda
bcbb	abaca
bcbc	acdda
bcbd	abaca
");
}

#[test]
fn showcase_program_end_to_end() {
    let source = include_str!("programs/showcase.as");
    let artifacts = assemble_clean(source);

    assert_eq!(
        artifacts.object.to_string(),
        " abab aaca\n\
         bcba\taaada\n\
         bcbb\tdddda\n\
         bcbc\taaaba\n\
         bcbd\tbdada\n\
         bcca\taaaca\n\
         bccb\tbdada\n\
         bccc\taaaca\n\
         bccd\tbabda\n\
         bcda\tbdbbc\n\
         bcdb\taaada\n\
         bcdc\tcdaba\n\
         bcdd\taaaab\n\
         bdaa\taacba\n\
         bdab\tbdcac\n\
         bdac\tabaca\n\
         bdad\tbddac\n\
         bdba\tddaaa\n\
         bdbb\tabcca\n\
         bdbc\tabccb\n\
         bdbd\taaaaa\n\
         bdca\taaaab\n\
         bdcb\tddddd\n\
         bdcc\taaaaa\n\
         bdcd\taaaaa\n\
         bdda\taaaad\n"
    );

    assert_eq!(record::listing(&artifacts.entries), "MAIN bcba\nLEN bdda\n");
    assert_eq!(record::listing(&artifacts.externals), "PRINT bcdd\n");
}

#[test]
fn object_body_matches_header_and_counts_up() {
    let artifacts = assemble_clean(include_str!("programs/showcase.as"));
    let text = artifacts.object.to_string();
    let mut lines = text.lines();

    let header = lines.next().expect("header");
    let mut counts = header.trim_start().split(' ');
    let ic = from_base4(counts.next().unwrap()).unwrap();
    let dc = from_base4(counts.next().unwrap()).unwrap();

    let body: Vec<&str> = lines.collect();
    assert_eq!(body.len(), (ic + dc) as usize);

    for (index, line) in body.iter().enumerate() {
        let (addr, word) = line.split_once('\t').expect("ADDR\\tWORD");
        assert_eq!(from_base4(addr), Some(100 + index as u16));
        assert_eq!(word.len(), 5);
        assert!(from_base4(word).is_some());
    }
}

#[test]
fn every_external_use_site_is_listed_once() {
    let source = " .extern XIT\n jsr XIT\n jmp XIT\n stop\n";
    let artifacts = assemble_clean(source);
    assert_eq!(record::listing(&artifacts.externals), "XIT bcbb\nXIT bcbd\n");
}

#[test]
fn addressing_mode_mismatch_discards_artifacts() {
    let assembly = assemble_program(" lea #5, r3\n stop\n").expect("fatal error");
    assert!(assembly.pass_errors.has_errors());
    assert!(assembly.artifacts.is_none());
}

#[test]
fn entry_declared_but_never_defined_discards_artifacts() {
    let assembly = assemble_program(" .entry LAB\n stop\n").expect("fatal error");
    assert!(assembly.pass_errors.has_errors());
    assert!(assembly.artifacts.is_none());
}

#[test]
fn entry_defined_later_lands_in_the_listing() {
    let artifacts = assemble_clean(" .entry LAB\n stop\nLAB: .data 2\n");
    assert_eq!(record::listing(&artifacts.entries), "LAB bcbb\n");
}

#[test]
fn preprocessor_failure_suppresses_everything() {
    let assembly = assemble_program("mcro A\nmcroend\n stop\n").expect("fatal error");
    assert!(assembly.source_errors.has_errors());
    assert!(assembly.expanded.is_none());
    assert!(assembly.artifacts.is_none());
}

#[test]
fn memory_budget_overrun_is_fatal() {
    assert!(assemble_program(" .mat [8][20]\n").is_err());
}
