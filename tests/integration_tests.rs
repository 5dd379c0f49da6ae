use std::path::{Path, PathBuf};

use levsim::{
    level_path, unify, CorpusSplitter, CorpusType, FilterPolicy, Level, LevelShardBuilder, Shard,
    Translator,
};
use levsim::model::copy_model;
use levsim::unify::SRC_TGT_PRED_UNIFIED;
use levsim::utils::textio::{read_lines, write_lines};

const LEVELS: [Level; 2] = [Level(2), Level(3)];

/// Five aligned pairs per level; one source sentence recurs across both
/// levels so unification has something to merge.
fn seed_corpus(dir: &Path) -> (PathBuf, PathBuf) {
    let src_base = dir.join("src.");
    let tgt_base = dir.join("tgt.");
    for &level in &LEVELS {
        let src: Vec<String> = (0..4)
            .map(|i| format!("complex sentence {} level {}", i, level))
            .chain(["shared across levels".to_string()])
            .collect();
        let tgt: Vec<String> = (0..4)
            .map(|i| format!("simple sentence {} level {}", i, level))
            .chain([format!("plain at {}", level)])
            .collect();
        write_lines(level_path(&src_base, level), &src).unwrap();
        write_lines(level_path(&tgt_base, level), &tgt).unwrap();
    }
    (src_base, tgt_base)
}

#[test]
fn test_two_level_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (src_base, tgt_base) = seed_corpus(dir.path());

    // split: 5 pairs at 0.8 give 4 train / 1 valid per level
    CorpusSplitter::new(&src_base, &tgt_base, 0.8)
        .split(&LEVELS)
        .unwrap();
    for &level in &LEVELS {
        assert_eq!(
            read_lines(dir.path().join(format!("train.src.{}", level)))
                .unwrap()
                .len(),
            4
        );
        assert_eq!(
            read_lines(dir.path().join(format!("valid.tgt.{}", level)))
                .unwrap()
                .len(),
            1
        );
    }

    // shards: one per (corpus type, level), every example tagged with its level
    let builder = LevelShardBuilder::new(
        src_base.clone(),
        tgt_base.clone(),
        dir.path().join("demo"),
        FilterPolicy {
            use_src_len: true,
            max_src_len: 50,
            max_tgt_len: 50,
        },
        false,
    );
    let train_paths = builder.build_all(CorpusType::Train, &LEVELS).unwrap();
    assert_eq!(train_paths.len(), 2);
    for (path, &level) in train_paths.iter().zip(&LEVELS) {
        let shard = Shard::load(path).unwrap();
        assert_eq!(shard.len(), 4);
        assert!(shard.examples.iter().all(|ex| ex.level == level));
    }
    builder.build_all(CorpusType::Valid, &LEVELS).unwrap();

    // translate: 5 hypotheses per level, original order, written per level
    let pred_base = dir.path().join("pred.");
    let mut translator = Translator::new(copy_model(&LEVELS)).with_output(&pred_base);
    for &level in &LEVELS {
        let hyps = translator
            .translate(
                &level_path(&src_base, level),
                Some(&level_path(&tgt_base, level)),
                level,
                2,
            )
            .unwrap();
        assert_eq!(hyps.len(), 5);
        assert_eq!(hyps, read_lines(level_path(&src_base, level)).unwrap());
    }

    // unify: concatenated corpora plus the ranked keyed document
    let corpora = unify(&LEVELS, &src_base, &tgt_base, &pred_base).unwrap();
    assert_eq!(corpora.src.len(), 10);
    assert_eq!(corpora.records.len(), 9);

    let shared = &corpora.records[0];
    assert_eq!(shared.src, "shared across levels");
    assert_eq!(shared.levels.len(), 2);
    assert_eq!(shared.levels[&Level(2)].tgt, "plain at 2");
    assert_eq!(shared.levels[&Level(3)].tgt, "plain at 3");
    assert!(corpora.records[1..]
        .iter()
        .all(|record| record.levels.len() == 1));

    let run_dir = dir.path().join("run");
    corpora.write(&run_dir).unwrap();
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(run_dir.join(SRC_TGT_PRED_UNIFIED)).unwrap())
            .unwrap();
    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 9);
    assert_eq!(keys[0], "shared across levels");
    assert_eq!(
        doc["shared across levels"]["2"]["prediction"],
        "shared across levels"
    );
}

#[test]
fn test_shard_filtering_never_reorders_beyond_sort_key() {
    let dir = tempfile::tempdir().unwrap();
    let src_base = dir.path().join("train.src.");
    let tgt_base = dir.path().join("train.tgt.");
    write_lines(
        level_path(&src_base, Level(2)),
        &["c c c", "a", "b b", "too long sentence kept out"],
    )
    .unwrap();
    write_lines(level_path(&tgt_base, Level(2)), &["t", "t", "t", "t"]).unwrap();

    let builder = LevelShardBuilder::new(
        dir.path().join("src."),
        dir.path().join("tgt."),
        dir.path().join("demo"),
        FilterPolicy {
            use_src_len: true,
            max_src_len: 3,
            max_tgt_len: 3,
        },
        false,
    );
    let paths = builder.build_all(CorpusType::Train, &[Level(2)]).unwrap();
    let shard = Shard::load(&paths[0]).unwrap();

    let sources: Vec<&str> = shard.examples.iter().map(|ex| ex.src.as_str()).collect();
    assert_eq!(sources, ["a", "b b", "c c c"]);
}
