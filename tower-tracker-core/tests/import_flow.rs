use chrono::{NaiveDate, NaiveDateTime};

use tower_tracker_core::{
    Delimiter, DuplicateResolution, FieldRegistry, ImportFormatSettings, MemoryStore, RunParser,
    RunStore, RunType, SourceGroup, detect_batch_duplicates, generate_composite_keys_set,
    merge_import, source_breakdown,
};

const BATTLE_REPORT: &str = "Battle Report
Battle Date\tNov 20, 2025 14:35
Game Time\t1d 13h 24m 51s
Real Time\t7h 46m 6s
Tier\t11
Wave\t5,012
Killed By\tRay
Coins earned\t43.91T
Cells Earned\t12.5K
Combat
Damage dealt\t9.5aa
Utility
Coins From Death Wave\t20T
Coins From Golden Tower\t15T
Golden bot coins earned\t8.5T
";

const CSV_EXPORT: &str = "Tier,Wave,Coins earned,Real Time,Battle Date,Notes
11,5012,43.91T,7h 46m 6s,\"Nov 20, 2025 14:35\",same as pasted
11,5100,45T,7h 50m,\"Nov 21, 2025 09:00\",new push
12+,900,1.1T,1h 2m,\"Nov 22, 2025 18:30\",tournament
11,5100,45T,7h 50m,\"Nov 21, 2025 09:00\",pasted twice
";

fn fallback() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 12, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn paste_then_csv_then_persist() {
    let store = RunStore::new(MemoryStore::default());
    let settings = store.import_settings().unwrap();
    let parser = RunParser::new(settings, fallback());

    let pasted = parser.parse_clipboard(BATTLE_REPORT);
    assert!(pasted.errors.is_empty(), "{:?}", pasted.errors);
    assert!(!pasted.format_mismatch.any());
    let first = pasted.run.unwrap();
    let merged = merge_import(&[], std::slice::from_ref(&first), DuplicateResolution::Skip);
    store.save_runs(&merged.runs).unwrap();

    let existing = store.load_runs().unwrap();
    assert_eq!(existing.len(), 1);
    assert_eq!(existing[0].id, first.id);

    let imported = parser.parse_delimited(CSV_EXPORT, &Delimiter::detect(CSV_EXPORT));
    assert_eq!(imported.success.len(), 4, "{:?}", imported.errors);
    assert_eq!(imported.failed, 0);

    let keys = generate_composite_keys_set(&existing);
    let batch = detect_batch_duplicates(&imported.success, &keys, &existing);
    assert_eq!(batch.new_runs.len(), 2);
    assert_eq!(batch.duplicates.len(), 1);
    assert_eq!(batch.duplicates[0].existing_run.id, first.id);
    assert_eq!(batch.new_runs[1].run_type, RunType::Tournament);

    let merged = merge_import(&existing, &imported.success, DuplicateResolution::Overwrite);
    assert_eq!(merged.added, 2);
    assert_eq!(merged.overwritten, 1);
    store.save_runs(&merged.runs).unwrap();

    let reloaded = store.load_runs().unwrap();
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded[0].id, first.id);
    assert_eq!(reloaded[0].notes(), Some("same as pasted"));
    assert_eq!(
        generate_composite_keys_set(&reloaded),
        generate_composite_keys_set(&merged.runs)
    );
}

#[test]
fn coin_sources_explain_most_of_the_total() {
    let parser = RunParser::new(ImportFormatSettings::default(), fallback());
    let run = parser.parse_clipboard(BATTLE_REPORT).run.unwrap();
    let breakdown = source_breakdown(&run, SourceGroup::CoinSources, &FieldRegistry::standard());
    let keys: Vec<_> = breakdown.sources.iter().map(|s| s.key).collect();
    assert_eq!(
        keys,
        vec![
            "coinsFromDeathWave",
            "coinsFromGoldenTower",
            "goldenBotCoinsEarned"
        ]
    );
    // 43.5T of 43.91T is within one percent.
    assert!(breakdown.discrepancy.is_none());
}

#[test]
fn european_paste_is_flagged_under_default_settings() {
    let report = "Battle Date\tnov. 20, 2025 14:35\nTier\t9\nCoins earned\t43,91T\n";
    let parser = RunParser::new(ImportFormatSettings::default(), fallback());
    let parsed = parser.parse_clipboard(report);
    assert!(parsed.format_mismatch.number_mismatch);
    assert!(parsed.format_mismatch.date_mismatch);

    let european = RunParser::new(ImportFormatSettings::european(), fallback());
    let parsed = european.parse_clipboard(report);
    assert!(!parsed.format_mismatch.any());
    assert_eq!(parsed.run.unwrap().coins_earned, 43_910_000_000_000.0);
}
