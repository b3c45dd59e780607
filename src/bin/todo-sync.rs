use todo_sync::cache::Cache;
use todo_sync::client::Client;
use todo_sync::config::Settings;
use todo_sync::Provider;

#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Invalid settings: {}", err);
            std::process::exit(1);
        }
    };

    let client = Client::from_settings(&settings);
    let cache = match Cache::from_file(&settings.data_folder, &settings.cache_file) {
        Ok((cache, _report)) => cache,
        Err(err) => {
            log::warn!("Invalid cache file: {}. Using an empty cache", err);
            settings.empty_cache()
        }
    };
    let mut provider = Provider::new(client, cache);

    println!("---- Local items, before sync -----");
    todo_sync::utils::print_item_list(&provider.items());

    println!("Starting a sync...");
    println!("Depending on your RUST_LOG value, you may see more or less details about the progress.");
    if let Err(err) = provider.load_items().await {
        log::warn!("Sync did not complete: {}. Any later change will trigger a full reconciliation.", err);
    }
    if provider.n_errors() > 0 {
        println!("{} errors or warnings have been reported, see the previous log lines for more info.", provider.n_errors());
    }

    println!("---- Local items, after sync -----");
    todo_sync::utils::print_item_list(&provider.items());
}
