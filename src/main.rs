//! Avatar Voice - 控制台演示
//!
//! 输入问题编号提问，`s` 打断，`v` 列出音色，`volume <0-1>` 调整音量，`q` 退出

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use avatar_voice::application::ports::SpeechEnginePort;
use avatar_voice::application::services::{SpeechController, VoiceCatalog};
use avatar_voice::config::{load_config, print_config, AppConfig, EngineKind};
use avatar_voice::domain::voice::{Voice, VoiceSelector};
use avatar_voice::infrastructure::adapters::{EspeakEngine, SimulatedSpeechEngine, TracingAnimator};
use avatar_voice::infrastructure::events::{EventPublisher, SpeechEvent};
use avatar_voice::infrastructure::widget::AvatarWidget;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Avatar Voice - 数字头像语音演示");
    print_config(&config);

    let engine = create_engine(&config);

    // 事件发布器与日志任务
    let events = EventPublisher::new().arc();
    tokio::spawn(log_events(events.subscribe()));

    // 音色目录及其监听任务
    let catalog = Arc::new(VoiceCatalog::new(
        engine.clone(),
        events.clone(),
        config.speech.poll_interval(),
    ));
    tokio::spawn(catalog.clone().run());

    let controller = Arc::new(SpeechController::new(
        engine,
        catalog.clone(),
        VoiceSelector::new(config.speech.selection_policy()),
        config.speech.controller_config(),
        events,
    ));

    let widget = Arc::new(AvatarWidget::new(
        controller,
        Arc::new(TracingAnimator::new()),
        config.avatar.clone(),
        config.questions.clone(),
        config.speech.default_volume,
    ));

    // 就绪后列出目标语言与男声音色
    {
        let catalog = catalog.clone();
        let language = config.speech.target_language.clone();
        tokio::spawn(async move {
            catalog.wait_until_ready().await;
            tracing::info!(
                language = %language,
                voices = ?names(catalog.voices_for_language(&language)),
                "Available target language voices"
            );
            tracing::info!(voices = ?names(catalog.masculine_voices()), "Available masculine voices");
        });
    }

    print_menu(&widget);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal");
                break;
            }
        };
        let Some(line) = line else { break };

        match line.trim() {
            "" => {}
            "q" => break,
            "s" => {
                if !widget.interrupt() {
                    println!("Nothing to stop");
                }
            }
            "v" => {
                for (index, voice) in catalog.all_voices().iter().enumerate() {
                    println!("  {:>2}. {}", index + 1, voice);
                }
                match widget.controller().selected_voice() {
                    Some(voice) => println!("Selected: {}", voice),
                    None => println!("Selected: <none>"),
                }
            }
            "?" => print_menu(&widget),
            input => {
                if let Some(value) = input.strip_prefix("volume ") {
                    match value.trim().parse::<f32>() {
                        Ok(volume) => {
                            widget.set_volume(volume);
                            println!("Volume: {:.2}", widget.volume());
                        }
                        Err(_) => println!("Invalid volume: {}", value),
                    }
                } else if let Some(name) = input.strip_prefix("voice ") {
                    if !widget.controller().select_by_name(name.trim()) {
                        println!("No voice named {:?}", name.trim());
                    }
                } else {
                    ask(&widget, input);
                }
            }
        }
    }

    widget.interrupt();
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},avatar_voice={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn create_engine(config: &AppConfig) -> Arc<dyn SpeechEnginePort> {
    match config.engine.kind {
        EngineKind::Simulated => {
            let engine = Arc::new(SimulatedSpeechEngine::new(
                config.engine.simulated.engine_config(),
            ));
            engine.start();
            engine
        }
        EngineKind::Espeak => {
            let engine = Arc::new(EspeakEngine::new(config.engine.espeak.engine_config()));
            engine.start();
            engine
        }
    }
}

/// 按编号提问，朗读在后台进行以便随时打断
fn ask(widget: &Arc<AvatarWidget>, input: &str) {
    let buttons = widget.buttons();
    let Some(button) = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| buttons.get(index))
    else {
        println!("Unknown command: {} (type ? for help)", input);
        return;
    };

    let widget = widget.clone();
    let question_id = button.id().to_string();
    tokio::spawn(async move {
        match widget.ask(&question_id).await {
            Ok(outcome) => tracing::debug!(question_id = %question_id, outcome = ?outcome, "Ask settled"),
            Err(e) => tracing::warn!(question_id = %question_id, error = %e, "Ask failed"),
        }
        println!("{}", widget.status());
    });
}

fn names(voices: Vec<Voice>) -> Vec<String> {
    voices.iter().map(|voice| voice.name().to_string()).collect()
}

fn print_menu(widget: &AvatarWidget) {
    println!();
    println!("{}", widget.status());
    for (index, button) in widget.buttons().iter().enumerate() {
        println!("  {}. {}", index + 1, button.label());
    }
    println!("  s - stop, v - voices, voice <name>, volume <0-1>, q - quit");
}

/// 把语音事件以 JSON 写入日志
async fn log_events(mut rx: broadcast::Receiver<SpeechEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => tracing::info!(event = %json, "Speech event"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize speech event"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped = skipped, "Speech event logger lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
