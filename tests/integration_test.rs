use canine_parentage::{
    archive, batch, loci, FileDiscovery, FileParser, ParentageTester, ReportFormat,
    ReportGenerator, Sex, Trio, Verdict, VerdictThresholds,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Write TPED panels for a trio: `autosomal` consistent markers plus
/// `errors` autosomal Mendelian errors, X/Y/MT markers for a male pup and one
/// unmapped marker.
fn write_trio(dir: &Path, autosomal: usize, errors: usize) -> anyhow::Result<()> {
    let mut pup = String::new();
    let mut dam = String::new();
    let mut sire = String::new();

    for i in 0..autosomal + errors {
        let chr = i % 38 + 1;
        let line = |a1: &str, a2: &str| format!("{} BICF2S{} 0 {} {} {}\n", chr, i, 1000 + i, a1, a2);
        dam.push_str(&line("A", "G"));
        sire.push_str(&line("C", "T"));
        if i < autosomal {
            pup.push_str(&line("G", "C"));
        } else {
            pup.push_str(&line("T", "T"));
        }
    }

    // X: hemizygous pup call from the dam
    pup.push_str("39 x1 0 500 A 0\n");
    dam.push_str("39 x1 0 500 G A\n");
    sire.push_str("39 x1 0 500 C 0\n");
    // Y: called in the pup, inherited from the sire
    pup.push_str("40 y1 0 600 T 0\n");
    dam.push_str("40 y1 0 600 0 0\n");
    sire.push_str("40 y1 0 600 T 0\n");
    // MT in PLINK numeric coding
    pup.push_str("42 mt1 0 700 4 4\n");
    dam.push_str("42 mt1 0 700 4 4\n");
    sire.push_str("42 mt1 0 700 2 2\n");
    // Unmapped, ignored
    pup.push_str("41 u1 0 800 A A\n");
    dam.push_str("41 u1 0 800 C C\n");
    sire.push_str("41 u1 0 800 G G\n");
    // Only in the pup's panel
    pup.push_str("1 extra 0 900 A A\n");

    fs::write(dir.join("pup.tped"), pup)?;
    fs::write(dir.join("dam.tped"), dam)?;
    fs::write(dir.join("sire.tped"), sire)?;
    Ok(())
}

fn load(dir: &Path) -> anyhow::Result<Trio> {
    let parser = FileParser::new();
    Ok(Trio::new(
        "litter",
        parser.parse(&dir.join("pup.tped"))?,
        parser.parse(&dir.join("dam.tped"))?,
        parser.parse(&dir.join("sire.tped"))?,
    ))
}

#[test]
fn test_verify_trio_from_files() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_trio(dir.path(), 197, 3)?;

    let report = ParentageTester::default().test(&load(dir.path())?);

    assert_eq!(report.offspring_id, "pup");
    assert_eq!(report.markers_joined, 204);
    assert_eq!(report.markers_unused, 1);
    assert_eq!(report.offspring_sex, Sex::Male);
    assert_eq!(report.autosomal.total_markers_evaluated, 200);
    assert_eq!(report.autosomal.inconsistent_marker_count, 3);
    assert_eq!(report.x.error_rate, 0.0);
    assert_eq!(report.y.as_ref().map(|y| y.error_rate), Some(0.0));
    assert_eq!(report.mitochondrial.error_rate, 0.0);
    assert_eq!(report.verdict, Verdict::Strong);
    Ok(())
}

#[test]
fn test_pipeline_is_idempotent() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_trio(dir.path(), 90, 10)?;
    let tester = ParentageTester::default();

    let first = tester.test(&load(dir.path())?);
    let second = tester.test(&load(dir.path())?);

    assert_eq!(first, second);
    assert_eq!(first.verdict, Verdict::Moderate);
    Ok(())
}

#[test]
fn test_minimum_marker_count() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_trio(dir.path(), 5, 0)?;
    let trio = load(dir.path())?;

    assert_eq!(ParentageTester::default().test(&trio).verdict, Verdict::VeryStrong);

    let strict = ParentageTester::new(VerdictThresholds {
        min_autosomal_markers: 100,
        ..VerdictThresholds::default()
    });
    assert_eq!(strict.test(&trio).verdict, Verdict::Weak);
    Ok(())
}

#[test]
fn test_intake_batch_and_reports() -> anyhow::Result<()> {
    let work = TempDir::new()?;
    let staging = TempDir::new()?;
    write_trio(staging.path(), 100, 0)?;

    // Zip the three panels as an upload
    let archive_path = work.path().join("upload.zip");
    let mut zip = zip::ZipWriter::new(File::create(&archive_path)?);
    for name in ["pup.tped", "dam.tped", "sire.tped"] {
        zip.start_file(name, zip::write::FileOptions::default())?;
        zip.write_all(&fs::read(staging.path().join(name))?)?;
    }
    zip.finish()?;

    let extracted = archive::unzip_file(&archive_path, &work.path().join("uploads"))?;
    let panels = FileDiscovery::new(false).discover_in_directory(&extracted.target_folder)?;
    assert_eq!(panels.len(), 3);

    let sheet = extracted.target_folder.join("trios.csv");
    fs::write(
        &sheet,
        "trio_id,offspring,dam,sire\nupload,pup.tped,dam.tped,sire.tped\nmissing,pup.tped,nope.tped,sire.tped\n",
    )?;
    let rows = batch::read_trio_sheet(&sheet)?;
    let trios = batch::load_trios(&rows, &FileParser::new());
    assert_eq!(trios.len(), 1);

    let reports = ParentageTester::default().test_all(&trios);
    assert_eq!(reports[0].verdict, Verdict::VeryStrong);

    let generator = ReportGenerator::new(&work.path().join("reports"))?;
    let written = generator.generate(&reports, ReportFormat::Json)?;
    let json = fs::read_to_string(&written[0])?;
    assert!(json.contains("\"verdict\": \"VeryStrong\""));
    Ok(())
}

#[test]
fn test_export_loci() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_trio(dir.path(), 3, 0)?;
    let panel = FileParser::new().parse(&dir.path().join("dam.tped"))?;

    let mut sink = loci::CsvSink::new(&dir.path().join("tables"))?;
    loci::export_panel(&panel, 12, 1, &mut sink)?;

    let loci_csv = fs::read_to_string(dir.path().join("tables/tbl_loci.csv"))?;
    // header + 3 autosomal + X, Y, MT, unmapped
    assert_eq!(loci_csv.lines().count(), 8);
    assert!(loci_csv.contains("8,1,BICF2S0,1000"));
    Ok(())
}
