//! Integration tests for the `llm` binary.
//!
//! Each test runs the binary against an isolated home, user directory and
//! config file. Model calls go to a wiremock server.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Fixtures
// =============================================================================

/// An isolated environment for one run of the binary.
struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        for sub in ["home", "xdg", "user", "work"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn user_dir(&self) -> PathBuf {
        self.dir.path().join("user")
    }

    fn work_dir(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    fn write_config(&self, contents: &str) {
        fs::write(self.config_path(), contents).unwrap();
    }

    /// Point the Anthropic provider at a mock server.
    fn use_server(&self, server: &MockServer) {
        self.use_server_with(server, "");
    }

    /// Point the Anthropic provider at a mock server, with extra config.
    fn use_server_with(&self, server: &MockServer, extra: &str) {
        self.write_config(&format!(
            "[providers.anthropic]\napi_base = \"{}\"\n\n{}",
            server.uri(),
            extra
        ));
    }

    fn write_project_config(&self, contents: &str) {
        let dir = self.work_dir().join(".llmx");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), contents).unwrap();
    }

    fn write_template(&self, name: &str, contents: &str) {
        let dir = self.user_dir().join("templates");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.yaml", name)), contents).unwrap();
    }

    /// A command for the binary with the environment isolated.
    fn llm(&self) -> Command {
        let mut cmd = Command::cargo_bin("llm").unwrap();
        cmd.current_dir(self.work_dir())
            .env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .env("HOME", self.dir.path().join("home"))
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env("LLMX_CONFIG", self.config_path())
            .env("LLM_USER_PATH", self.user_dir())
            .env("ANTHROPIC_API_KEY", "test-key");
        cmd
    }
}

fn anthropic_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
    }))
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// =============================================================================
// Basic CLI
// =============================================================================

#[test]
fn no_arguments_prints_help() {
    let env = TestEnv::new();
    env.llm()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
    let env = TestEnv::new();
    env.llm()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("llm"));
}

#[test]
fn completion_bash() {
    let env = TestEnv::new();
    env.llm()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_llm"));
}

#[test]
fn commands_lists_builtin_presets() {
    let env = TestEnv::new();
    env.llm()
        .arg("commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("simplify"))
        .stdout(predicate::str::contains("zshcmd"));
}

#[test]
fn unknown_preset_fails() {
    let env = TestEnv::new();
    env.llm()
        .args(["commands", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command 'nope'"));
}

// =============================================================================
// Templates
// =============================================================================

#[test]
fn templates_create_list_show() {
    let env = TestEnv::new();

    env.llm()
        .args(["templates", "create", "greet", "Hello {{name}}"])
        .assert()
        .success();
    assert!(env.user_dir().join("templates/greet.yaml").exists());

    env.llm()
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greet"));

    env.llm()
        .args(["templates", "show", "greet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prompt:"))
        .stdout(predicate::str::contains("Hello {{name}}"));
}

#[test]
fn templates_create_refuses_overwrite_without_force() {
    let env = TestEnv::new();
    env.write_template("greet", "prompt: Hi\n");

    env.llm()
        .args(["templates", "create", "greet", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    env.llm()
        .args(["templates", "create", "greet", "Other", "--force"])
        .assert()
        .success();
    assert!(read(&env.user_dir().join("templates/greet.yaml")).contains("Other"));
}

#[test]
fn templates_path_prints_store_dir() {
    let env = TestEnv::new();
    env.llm()
        .args(["templates", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("templates"));
}

#[test]
fn unknown_template_fails_before_any_request() {
    let env = TestEnv::new();
    env.llm()
        .args(["-t", "nope", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template not found: 'nope'"));
}

#[test]
fn missing_variable_is_reported() {
    let env = TestEnv::new();
    env.write_template("greet", "prompt: \"Hello {{name}}, rate={{temp}}\"\n");

    env.llm()
        .args(["-t", "greet", "-p", "name", "Ada"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing template variables: temp"));
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn config_set_then_get() {
    let env = TestEnv::new();

    env.llm()
        .args(["config", "set", "defaults.temperature", "0.5"])
        .assert()
        .success();
    assert!(read(&env.config_path()).contains("temperature = 0.5"));

    env.llm()
        .args(["config", "get", "defaults.temperature"])
        .assert()
        .success()
        .stdout("0.5\n");
}

#[test]
fn config_get_reports_builtin_defaults() {
    let env = TestEnv::new();
    env.llm()
        .args(["config", "get", "defaults.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anthropic/"));
}

#[test]
fn config_set_rejects_wrong_type() {
    let env = TestEnv::new();
    env.llm()
        .args(["config", "set", "defaults.temperature", "warm"])
        .assert()
        .failure();
    assert!(!env.config_path().exists());
}

#[test]
fn config_set_project_writes_project_file() {
    let env = TestEnv::new();
    env.llm()
        .args(["config", "set", "markdown", "false", "--project"])
        .assert()
        .success();

    let project = env.work_dir().join(".llmx/config.toml");
    assert!(read(&project).contains("markdown = false"));
    assert!(!env.config_path().exists());

    env.llm()
        .args(["config", "get", "markdown"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn config_set_project_refuses_global_only_keys() {
    let env = TestEnv::new();
    for key in ["providers.anthropic.api_base", "providers.openai.api_key_env", "user_dir"] {
        env.llm()
            .args(["config", "set", key, "value", "--project"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("only be set in the global config"));
    }
    assert!(!env.work_dir().join(".llmx/config.toml").exists());
}

#[test]
fn config_rejects_unknown_key() {
    let env = TestEnv::new();
    env.llm()
        .args(["config", "get", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn invalid_config_fails_every_command() {
    let env = TestEnv::new();
    env.write_config("timeout_secs = \"soon\"\n");
    env.llm().args(["templates", "list"]).assert().failure();
}

// =============================================================================
// Shell commands
// =============================================================================

#[test]
fn cmd_failure_propagates_exit_code() {
    let env = TestEnv::new();
    env.llm()
        .args(["cmd", "echo oops >&2; exit 3"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Command error: oops"));
}

// =============================================================================
// Model round trips
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn prompt_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "hello there"}],
            "temperature": 0.0,
        })))
        .respond_with(anthropic_reply("General Kenobi"))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.use_server(&server);

    env.llm()
        .args(["--no-md", "hello", "there"])
        .assert()
        .success()
        .stdout(predicate::str::contains("General Kenobi"));
}

#[tokio::test(flavor = "multi_thread")]
async fn piped_input_is_tagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_string_contains("Given the following python code:"))
        .and(body_string_contains("<PythonCode>"))
        .respond_with(anthropic_reply("Looks fine"))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.use_server(&server);

    env.llm()
        .args(["--no-md", "--tag", "python_code", "review this"])
        .write_stdin("print('hi')\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Looks fine"));
}

#[tokio::test(flavor = "multi_thread")]
async fn template_options_and_cli_overrides() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({
            "system": "Be brief.",
            "messages": [{"role": "user", "content": "Summarize notes for engineers"}],
            "temperature": 0.9,
            "max_tokens": 100,
        })))
        .respond_with(anthropic_reply("Done"))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.use_server(&server);
    env.write_template(
        "summary",
        "system: Be brief.\n\
         prompt: \"Summarize {{input}} for {{audience}}\"\n\
         defaults:\n  audience: engineers\n\
         options:\n  temperature: 0.3\n  max_tokens: 100\n",
    );

    env.llm()
        .args(["--no-md", "-t", "summary", "--temperature", "0.9", "notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Done"));
}

#[tokio::test(flavor = "multi_thread")]
async fn shell_preset_sends_command_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({
            "model": "claude-3-sonnet-20240229",
            "system": "Explain this output.",
            "messages": [{"role": "user", "content": "hi"}],
        })))
        .respond_with(anthropic_reply("It says hi"))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.use_server(&server);
    env.write_template("zshcmd", "Explain this output.");

    env.llm()
        .args(["--no-md", "commands", "zshcmd", "echo", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("It says hi"));
}

#[tokio::test(flavor = "multi_thread")]
async fn project_config_cannot_redirect_api_key() {
    let configured = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .respond_with(anthropic_reply("From the configured host"))
        .expect(1)
        .mount(&configured)
        .await;

    let foreign = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(anthropic_reply("From the project host"))
        .expect(0)
        .mount(&foreign)
        .await;

    let env = TestEnv::new();
    env.use_server(&configured);
    env.write_project_config(&format!(
        "[providers.anthropic]\napi_base = \"{}\"\napi_key_env = \"PATH\"\n",
        foreign.uri()
    ));

    env.llm()
        .args(["--no-md", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("From the configured host"))
        .stderr(predicate::str::contains(
            "ignoring 'providers' in project config",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_without_terminal_sends_one_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({ "temperature": 0.7 })))
        .and(body_string_contains("Given the following:"))
        .and(body_string_contains("ctx"))
        .and(body_string_contains("hi"))
        .respond_with(anthropic_reply("Hello back"))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.use_server_with(&server, "[commands.chat.params]\ntemperature = 0.7\n");

    env.llm()
        .args(["--no-md", "chat", "hi"])
        .write_stdin("ctx\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello back"));
}

#[tokio::test(flavor = "multi_thread")]
async fn fragments_fill_slots_and_last_default_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({
            "messages": [{
                "role": "user",
                "content": "Write about notes. Tone: terse.\n\nSign off as Ada.",
            }],
            "temperature": 0.4,
        })))
        .respond_with(anthropic_reply("Merged"))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.use_server(&server);
    env.write_template(
        "base",
        "prompt: \"Write about {{input}}. {{> style}}\"\n\
         defaults:\n  tone: calm\n",
    );
    env.write_template(
        "style",
        "prompt: \"Tone: {{tone}}.\"\n\
         defaults:\n  tone: dry\n",
    );
    env.write_template(
        "signoff",
        "prompt: \"Sign off as {{author}}.\"\n\
         defaults:\n  tone: terse\n  author: Ada\n\
         options:\n  temperature: 0.4\n",
    );

    env.llm()
        .args(["--no-md", "-t", "base", "-f", "style", "-f", "signoff", "notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cmd_sends_raw_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "hi"}],
        })))
        .respond_with(anthropic_reply("Got it"))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.use_server(&server);

    env.llm()
        .args(["--no-md", "cmd", "echo", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Got it"));
}

#[tokio::test(flavor = "multi_thread")]
async fn auth_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"},
        })))
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.use_server(&server);

    env.llm()
        .args(["--no-md", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("authentication failed: invalid x-api-key"));
}

#[test]
fn missing_api_key_is_reported() {
    let env = TestEnv::new();
    env.llm()
        .env_remove("ANTHROPIC_API_KEY")
        .args(["--no-md", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API key for anthropic"));
}
