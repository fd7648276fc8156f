//! End-to-end runs of the translation pipeline against real files:
//! detection, extraction, scheduling, reassembly and writing.

use mc_translator_core::{
    CancelFlag, ConfigError, DocumentKind, Engine, PipelineError, RunConfig, RunOutcome,
    TranslationCache, TranslationError, Translator,
};
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const FIXTURE_PROPERTIES: &str = include_str!("fixtures/en_us.properties");
const FIXTURE_YAML: &str = include_str!("fixtures/messages.yml");

/// Wraps every text in brackets; can be told to fail or panic on one input.
#[derive(Default)]
struct Bracketing {
    calls: Arc<AtomicUsize>,
    fail_on: Option<&'static str>,
    panic_on: Option<&'static str>,
}

impl Bracketing {
    fn counted() -> (Self, Arc<AtomicUsize>) {
        let translator = Self::default();
        let calls = Arc::clone(&translator.calls);
        (translator, calls)
    }
}

impl Translator for Bracketing {
    fn name(&self) -> &'static str {
        "bracketing"
    }

    fn translate(&mut self, text: &str, _: &str, _: &str) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on == Some(text) {
            panic!("translator crashed on {text:?}");
        }
        if self.fail_on == Some(text) {
            return Err(TranslationError::Failure("model not loaded".into()));
        }
        Ok(format!("[{text}]"))
    }
}

fn setup(dir: &TempDir, name: &str, content: &str) -> RunConfig {
    let source = dir.path().join(name);
    fs::write(&source, content).unwrap();
    let mut config = RunConfig::new(source, dir.path().join("translated").join(name));
    config.batch_delay_secs = 0.0;
    config
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn properties_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "en_us.properties", FIXTURE_PROPERTIES);
    let output = config.output_file.clone();

    let report = Engine::new(config, Box::new(Bracketing::default()))
        .translate_file()
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.document_kind, DocumentKind::Properties);
    assert_eq!(report.units, 5);
    assert_eq!(report.failed_batches, 0);
    assert_eq!(
        read(&output),
        "# Example plugin messages\n\
         welcome.message=[Hello] &a[Player]%player% [has joined!]\n\
         farewell.message=[Goodbye, see you soon]\n\
         item.sword=minecraft:diamond_sword\n\
         count=42\n\
         \n\
         broken line without separator\n\
         motd=&6&l[Welcome to the server]\n"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ignorable_values_only_lose_key_padding() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "ids.properties", "spaced.key = ab\nplaceholder=%player%\n");
    let output = config.output_file.clone();
    let (translator, calls) = Bracketing::counted();

    Engine::new(config, Box::new(translator))
        .translate_file()
        .await
        .unwrap();

    assert_eq!(read(&output), "spaced.key=ab\nplaceholder=%player%\n");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn single_yaml_value_keeps_nesting() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(&dir, "messages.yml", "messages:\n  welcome: \"Hi there\"\n");
    config.batch_size = 1;
    config.worker_count = 1;
    let output = config.output_file.clone();

    let report = Engine::new(config, Box::new(Bracketing::default()))
        .translate_file()
        .await
        .unwrap();

    assert_eq!(report.units, 1);
    assert_eq!(report.total_batches, 1);
    let document: Value = serde_yaml::from_str(&read(&output)).unwrap();
    let root = document.as_mapping().unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(document["messages"]["welcome"], Value::from("[Hi there]"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn yaml_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(&dir, "messages.yml", FIXTURE_YAML);
    config.batch_size = 2;
    config.worker_count = 3;
    let output = config.output_file.clone();

    let report = Engine::new(config, Box::new(Bracketing::default()))
        .translate_file()
        .await
        .unwrap();
    assert_eq!(report.document_kind, DocumentKind::Yaml);
    assert_eq!(report.units, 5);
    assert_eq!(report.total_batches, 3);

    let text = read(&output);
    let document: Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(document["prefix"], Value::from("&8[&6Shop&8] "));
    assert_eq!(document["messages"]["welcome"], Value::from("[Welcome to the shop]"));
    assert_eq!(
        document["messages"]["balance"],
        Value::from("[Your balance is] %balance%")
    );
    assert_eq!(document["messages"]["empty"], Value::from(""));
    assert_eq!(
        document["help"][0],
        Value::from("&e[Use] /shop [buy to purchase items]")
    );
    assert_eq!(document["help"][1], Value::from("ok"));
    assert_eq!(document["help"][2], Value::from("[Ask an admin for help]"));
    assert_eq!(document["settings"]["max-items"], Value::from(64));
    assert_eq!(document["settings"]["enabled"], Value::from(true));
    assert_eq!(document["settings"]["sound"], Value::from("entity.player.levelup"));

    let keys: Vec<&str> = document
        .as_mapping()
        .unwrap()
        .keys()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(keys, vec!["prefix", "messages", "help", "settings"]);
    assert!(!text.contains('{'), "nested structures must use block style");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_run_leaves_output_untouched() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "en_us.properties", FIXTURE_PROPERTIES);
    let output = config.output_file.clone();
    fs::create_dir_all(output.parent().unwrap()).unwrap();
    fs::write(&output, "previous=Keep me\n").unwrap();

    let (translator, calls) = Bracketing::counted();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let report = Engine::new(config, Box::new(translator))
        .with_cancel_flag(cancel)
        .translate_file()
        .await
        .unwrap();

    assert!(report.is_cancelled());
    assert!(report.output_path.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(read(&output), "previous=Keep me\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_translation_keeps_source_text() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "lang.properties", "a=Open the door\nb=Close the door\n");
    let output = config.output_file.clone();
    let translator = Bracketing {
        fail_on: Some("Open the door"),
        ..Bracketing::default()
    };

    let report = Engine::new(config, Box::new(translator))
        .translate_file()
        .await
        .unwrap();

    assert_eq!(read(&output), "a=Open the door\nb=[Close the door]\n");
    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.cache_entries, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn crashing_batch_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(
        &dir,
        "lang.properties",
        "a=First message here\nb=Second message here\nc=Third message here\n",
    );
    config.batch_size = 1;
    let output = config.output_file.clone();
    let translator = Bracketing {
        panic_on: Some("Second message here"),
        ..Bracketing::default()
    };

    let report = Engine::new(config, Box::new(translator))
        .translate_file()
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.total_batches, 3);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(
        read(&output),
        "a=[First message here]\nb=Second message here\nc=[Third message here]\n"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shared_cache_spans_runs() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(TranslationCache::new());

    let (first, first_calls) = Bracketing::counted();
    let config = setup(&dir, "one.properties", "a=Repeated phrase\nb=Repeated phrase\n");
    Engine::new(config, Box::new(first))
        .with_cache(Arc::clone(&cache))
        .translate_file()
        .await
        .unwrap();
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);

    let (second, second_calls) = Bracketing::counted();
    let config = setup(&dir, "two.yml", "title: Repeated phrase\n");
    let output = config.output_file.clone();
    Engine::new(config, Box::new(second))
        .with_cache(cache)
        .translate_file()
        .await
        .unwrap();
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    assert!(read(&output).contains("[Repeated phrase]"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn backup_is_kept_when_requested() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(&dir, "lang.properties", "a=Fresh text here\n");
    config.backup_existing = true;
    let output = config.output_file.clone();
    fs::create_dir_all(output.parent().unwrap()).unwrap();
    fs::write(&output, "a=Stale text\n").unwrap();

    let report = Engine::new(config, Box::new(Bracketing::default()))
        .translate_file()
        .await
        .unwrap();

    let backup = report.backup_path.expect("backup path");
    assert_eq!(read(&backup), "a=Stale text\n");
    assert_eq!(read(&output), "a=[Fresh text here]\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_source_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::new(dir.path().join("absent.yml"), dir.path().join("out.yml"));

    let err = Engine::new(config, Box::new(Bracketing::default()))
        .translate_file()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Config(_)));
    assert!(!dir.path().join("out.yml").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unwritable_output_fails_before_translating() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(&dir, "lang.properties", "a=Open the door\nb=Close the door\n");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "plain file").unwrap();
    config.output_file = blocker.join("out.properties");
    let (translator, calls) = Bracketing::counted();

    let err = Engine::new(config, Box::new(translator))
        .translate_file()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Config(ConfigError::UnwritableOutput { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn content_sniffing_picks_yaml_for_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "messages.txt", "greeting: Good morning everyone\n");
    let output = config.output_file.clone();

    let report = Engine::new(config, Box::new(Bracketing::default()))
        .translate_file()
        .await
        .unwrap();

    assert_eq!(report.document_kind, DocumentKind::Yaml);
    let document: Value = serde_yaml::from_str(&read(&output)).unwrap();
    assert_eq!(document["greeting"], Value::from("[Good morning everyone]"));
}
