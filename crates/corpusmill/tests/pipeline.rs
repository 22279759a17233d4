#![allow(missing_docs)]
#![cfg(feature = "testing")]

//! End-to-end pipeline: declarative config file -> processor -> sampled,
//! cached corpus -> indexed instances.

use std::fs;
use std::sync::Arc;

use corpusmill::config::load_processor;
use corpusmill::corpus::{Corpus, CorpusDataset, CorpusOptions, LazyCorpus};
use corpusmill::processor::{PadSide, Padding};
use corpusmill::testing::StubTokenizer;
use corpusmill::types::IGNORE_INDEX;
use tempdir::TempDir;

const CONVERSATION_CONFIG: &str = r#"{
    "conversation": {
        "conv_template": "vicuna_v1.1",
        "conv_keyword": "conversations",
        "role_keyword": "from",
        "cont_keyword": "value",
        "roles": {"human": 0, "gpt": 1}
    },
    "truncation": {"enable": false, "max_tokens": null}
}"#;

const DATA: &str = r#"{"conversations": [{"from": "human", "value": "Hi"}, {"from": "gpt", "value": "Hello"}]}

{"conversations": [{"from": "human", "value": "Sum 2+2"}, {"from": "gpt", "value": "4"}]}
{"conversations": [{"from": "human", "value": "Bye"}, {"from": "gpt", "value": "Later"}]}
"#;

#[test]
fn test_conversation_pipeline_with_cache() {
    let tmp = TempDir::new("corpusmill-pipeline").unwrap();
    let config_path = tmp.path().join("dataconfig.json");
    let data_path = tmp.path().join("chats.json");
    let cache_dir = tmp.path().join("data_cache");

    fs::write(&config_path, CONVERSATION_CONFIG).unwrap();
    fs::write(&data_path, DATA).unwrap();

    let tokenizer = Arc::new(StubTokenizer::new());
    let processor = load_processor(
        &config_path,
        tokenizer.clone(),
        Padding::default().with_side(PadSide::Right).with_length(Some(256)),
    )
    .unwrap();

    let options = CorpusOptions::default()
        .with_max_instance(Some(3))
        .with_cache_dir(Some(&cache_dir))
        .with_progress(false);

    let corpus = Corpus::open(&data_path, processor.clone(), options.clone()).unwrap();
    assert_eq!(corpus.len(), 3);

    for instance in corpus.iter() {
        // Padding invariant.
        assert_eq!(instance.input_ids.len(), 256);
        assert_eq!(instance.labels.len(), 256);
        assert_eq!(instance.attention_mask.len(), 256);

        // Responder tokens survive masking.
        assert!(instance.labels.iter().any(|&l| l != IGNORE_INDEX));
    }

    // Second open loads the checkpoint without re-tokenizing.
    tokenizer.reset_calls();
    let cached = Corpus::open(&data_path, processor, options).unwrap();
    assert_eq!(tokenizer.encode_calls(), 0);
    assert_eq!(cached.instances(), corpus.instances());
}

#[test]
fn test_lazy_prefix_equals_eager_prefix() {
    let tmp = TempDir::new("corpusmill-pipeline").unwrap();
    let config_path = tmp.path().join("dataconfig.json");
    let data_path = tmp.path().join("chats.json");

    fs::write(&config_path, CONVERSATION_CONFIG).unwrap();
    fs::write(&data_path, DATA).unwrap();

    let tokenizer = Arc::new(StubTokenizer::new());
    let processor = load_processor(&config_path, tokenizer, Padding::default()).unwrap();

    let options = CorpusOptions::default()
        .with_max_instance(Some(2))
        .with_use_cache(false)
        .with_progress(false);

    let eager = Corpus::open(&data_path, processor.clone(), options.clone()).unwrap();
    let lazy = LazyCorpus::open(&data_path, processor, options).unwrap();

    assert_eq!(eager.len(), lazy.len());
    for index in 0..eager.len() {
        assert_eq!(
            eager.get(index).unwrap().unwrap(),
            lazy.get(index).unwrap().unwrap(),
        );
    }
}
