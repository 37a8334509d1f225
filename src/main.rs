mod admin;
mod config;
mod dialogue;
mod import;
mod quiz;
mod store;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatgpt::{client::ChatGPT, config::ChatGPTEngine};
use dotenv::dotenv;
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
};

use admin::AdminCommand;
use config::Config;
use dialogue::State;
use import::ImportPipeline;
use quiz::{ai_helper::QuizHelper, bank::QuestionBank};
use store::QuestionStore;

type UserInfoStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // A missing .env is fine when the variables come from the environment
    dotenv().ok();

    pretty_env_logger::init();
    log::info!("Starting grammar quiz bot...");

    let config = Arc::new(Config::from_env()?);

    let bot = Bot::from_env();

    log::info!("Opening dialogue storage at {}", config.dialogue_db_path);
    let storage: UserInfoStorage = SqliteStorage::open(&config.dialogue_db_path, Json)
        .await?
        .erase();

    let store = Arc::new(Mutex::new(QuestionStore::open(&config.question_store_path)?));
    let standard = Arc::new(QuestionBank::standard());
    log::info!("Standard question bank loaded: {} questions", standard.len());

    let gpt = {
        let mut gpt = ChatGPT::new(config.chatgpt_api_key.clone())?;

        gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        gpt.config.temperature = 0.3;
        gpt.config.timeout = Duration::from_secs(60);

        gpt
    };
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let pipeline = Arc::new(ImportPipeline::new(
        http,
        Arc::new(QuizHelper::new(gpt)),
        config.firecrawl_api_key.clone(),
    ));

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<AdminCommand>()
                .endpoint(admin::handle_command),
        )
        .branch(
            dptree::entry()
                .enter_dialogue::<Message, ErasedStorage<State>, State>()
                .branch(
                    dptree::filter(|msg: Message| msg.text() == Some("/start"))
                        .endpoint(dialogue::start),
                )
                .branch(dptree::case![State::Start].endpoint(dialogue::start))
                .branch(dptree::case![State::ReceiveFullName].endpoint(dialogue::receive_full_name))
                .branch(
                    dptree::case![State::ReceiveCategory { username }]
                        .endpoint(dialogue::receive_category),
                )
                .branch(
                    dptree::case![State::Assessment { category, quiz }]
                        .endpoint(dialogue::assessment),
                ),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![storage, config, store, standard, pipeline])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
