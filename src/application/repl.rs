use std::collections::BTreeMap;
use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Author;
use crate::domain::models::Command;
use crate::domain::models::Event;
use crate::domain::models::OutboundFrame;
use crate::domain::models::Status;
use crate::domain::services::ChatService;
use crate::domain::services::ConversationStore;
use crate::domain::services::Dispatcher;
use crate::infrastructure::api::ChartTransformRequest;
use crate::infrastructure::api::ChartsClient;
use crate::infrastructure::api::EntitiesClient;
use crate::infrastructure::transport::Socket;
use crate::infrastructure::transport::SocketOptions;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /sessions (/s) - Lists the saved conversations announced by the server.
- /history [SESSION_ID] - Replaces the current conversation with a saved one.
- /filters - Shows the parameters the server is currently waiting on.
- /filter (/f) [NAME=VALUE ...] - Answers the outstanding parameter request.
- /entities - Lists the business entities available for filtering.
- /select [TYPE] [NAME] - Toggles an entity selection on or off.
- /chart [MESSAGE_ID] [TYPE] [X_AXIS] [Y1,Y2,...] - Renders a result as a chart. With only a message id, shows the chart rendered earlier.
- /result [MESSAGE_ID] - Shows the detailed result payloads recorded for a reply.
- /cancel - Abandons the in-flight request. Best effort; the server may finish anyway.
- /connect - Redials the server after a dropped connection.
- /quit /exit (/q) - Exit Cairn.
- /help (/h) - Provides this help menu.
        "#;

    return text.trim().to_string();
}

fn render_new_messages(store: &ConversationStore, printed: &mut usize) {
    if store.messages().len() < *printed {
        // A history replay swapped the conversation out from under us.
        println!("--- conversation restored ---");
        *printed = 0;
    }

    for message in &store.messages()[*printed..] {
        println!("{}: {}", message.author.to_string(), message.content.as_text());
        if message.author == Author::Assistant {
            let thinking = store.thinking_time(&message.message_id);
            if thinking > 0 {
                println!("  (thought for {thinking}s)");
            }
        }
    }
    *printed = store.messages().len();
}

fn render_new_progress(store: &ConversationStore, seen: &mut HashMap<String, usize>) {
    for message in store.messages() {
        let trail = store.progress_trail(&message.message_id);
        let count = seen.entry(message.message_id.to_string()).or_insert(0);
        if *count > trail.len() {
            *count = trail.len();
            continue;
        }

        for step in &trail[*count..] {
            println!("  … {step}");
        }
        *count = trail.len();
    }
}

fn render_filter_prompt(store: &ConversationStore, active: &mut Option<String>) {
    let current = store
        .active_filter_request()
        .map(|request| return request.message_id.to_string());
    if current == *active {
        return;
    }

    if let Some(request) = store.active_filter_request() {
        println!("The server needs more parameters before it can finish:");
        for filter in &request.filters {
            let mut line = format!("  - {} ({})", filter.name, filter.filter_type);
            if filter.is_required {
                line = format!("{line} [required]");
            }
            if let Some(values) = &filter.enum_values {
                line = format!("{line} one of: {}", values.join(", "));
            }
            println!("{line}");
        }
        println!("Answer with /filter name=value ...");
    }

    *active = current;
}

fn parse_filter_values(args: &[String]) -> Option<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();
    for arg in args {
        let (key, value) = arg.split_once('=')?;
        if key.is_empty() || value.is_empty() {
            return None;
        }
        values.insert(key.to_string(), value.to_string());
    }

    if values.is_empty() {
        return None;
    }

    return Some(values);
}

fn print_result(store: &ConversationStore, message_id: &str) {
    if store.message(message_id).is_none() {
        println!("No message with id {message_id}.");
        return;
    }

    match store.detailed_formatted_result(message_id) {
        Some(value) => println!("formatted: {value}"),
        None => println!("No detailed formatting recorded yet."),
    }
    if let Some(value) = store.detailed_raw_result(message_id) {
        println!("raw: {value}");
    }
    if let Some(value) = store.chart_suggestions(message_id) {
        println!("chart suggestions: {value}");
    }
    if store.is_warehouse_query(message_id) {
        println!("(answered from the warehouse)");
    }
}

async fn handle_chart_command(
    command: &Command,
    store: &mut ConversationStore,
    charts: &ChartsClient,
) {
    if command.args.len() == 1 {
        match store.chart_data(&command.args[0]) {
            Some(payload) => println!("{payload}"),
            None => println!("No chart rendered for {} yet.", command.args[0]),
        }
        return;
    }

    if command.args.len() < 4 {
        println!("Usage: /chart MESSAGE_ID TYPE X_AXIS Y1,Y2,...");
        return;
    }

    let message_id = command.args[0].to_string();
    let raw_result = match store.raw_result(&message_id) {
        Some(value) => value.to_owned(),
        None => {
            println!("No raw result recorded for {message_id}.");
            return;
        }
    };

    let request = ChartTransformRequest {
        chart_type: command.args[1].to_string(),
        x_axis: command.args[2].to_string(),
        y_axes: command.args[3]
            .split(',')
            .map(|axis| return axis.to_string())
            .collect(),
        raw_result,
    };

    match charts.transform(&request).await {
        Ok(payload) => {
            store.set_chart_data(&message_id, payload);
            println!("Chart ready for {message_id}.");
        }
        Err(err) => {
            tracing::error!(error = ?err, "Chart transform failed");
            println!("Chart transform failed: {err}");
        }
    }
}

fn print_entities(store: &ConversationStore) {
    if let Some(error) = &store.entities_error {
        println!("Business entities are unavailable: {error}");
        return;
    }

    for (entity_type, entries) in store.entities() {
        let names = entries
            .iter()
            .map(|entity| return entity.name.to_string())
            .collect::<Vec<String>>();
        println!("{entity_type}: {}", names.join(", "));
    }

    if !store.selected_entities().is_empty() {
        let selected = store
            .selected_entities()
            .iter()
            .map(|item| return item.id.to_string())
            .collect::<Vec<String>>();
        println!("selected: {}", selected.join(", "));
    }
}

pub async fn start(session_id: String, user_id: String) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<OutboundFrame>();

    let mut store = ConversationStore::new(&session_id, &user_id);
    let service = ChatService::new(outbound_tx);
    let charts = ChartsClient::default();

    let heartbeat = Config::get(ConfigKey::HeartbeatInterval)
        .parse::<u64>()
        .unwrap_or(30);
    let mut socket = Socket::new(
        SocketOptions {
            server_url: Config::get(ConfigKey::ServerURL),
            context: store.context(),
            heartbeat_interval: Duration::from_secs(heartbeat),
        },
        event_tx.clone(),
    );

    if socket.connect().await.is_err() {
        println!(
            "Could not reach {}. Use /connect to retry.",
            Config::get(ConfigKey::ServerURL)
        );
    }

    match EntitiesClient::default().fetch().await {
        Ok(response) => store.set_entities(response.into_map()),
        Err(err) => {
            tracing::error!(error = ?err, "Failed to fetch business entities");
            store.set_entities_error(&err.to_string());
        }
    }

    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printed = 0;
    let mut progress_seen: HashMap<String, usize> = HashMap::new();
    let mut active_filter: Option<String> = None;

    render_new_messages(&store, &mut printed);

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(Event::SocketStatus(status)) => {
                    store.set_status(status);
                    println!("[{status}]");
                    if status == Status::Connected {
                        service.send_connect(&store)?;
                    }
                }
                Some(Event::SocketFrame(payload)) => {
                    Dispatcher::handle(&mut store, payload);
                    render_new_messages(&store, &mut printed);
                    render_new_progress(&store, &mut progress_seen);
                    render_filter_prompt(&store, &mut active_filter);
                }
                None => break,
            },
            frame = outbound_rx.recv() => match frame {
                Some(frame) => socket.send(&frame),
                None => break,
            },
            line = stdin_lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }

                if let Some(command) = Command::parse(text) {
                    if command.is_quit() {
                        break;
                    }
                    if command.is_help() {
                        println!("{}", help_text());
                    } else if command.is_cancel() {
                        if let Err(err) = service.cancel_request(&mut store) {
                            println!("{err}");
                        }
                    } else if command.is_connect() {
                        if socket.is_connected() {
                            println!("Already connected.");
                        } else if socket.connect().await.is_err() {
                            println!("Still unreachable.");
                        }
                    } else if command.is_sessions() {
                        for session in store.sessions() {
                            println!("- ({}) {}, updated {}", session.session_id, session.title, session.updated_at);
                        }
                        if store.sessions().is_empty() {
                            println!("No saved conversations yet.");
                        }
                    } else if command.is_history() {
                        match command.args.first() {
                            Some(target) => {
                                if let Err(err) = service.get_chat_history(&store, target) {
                                    println!("{err}");
                                }
                            }
                            None => println!("Usage: /history SESSION_ID"),
                        }
                    } else if command.is_filters() {
                        active_filter = None;
                        render_filter_prompt(&store, &mut active_filter);
                        if store.active_filter_request().is_none() {
                            println!("Nothing is waiting on parameters.");
                        }
                    } else if command.is_filter_submit() {
                        match parse_filter_values(&command.args) {
                            Some(values) => match service.send_filter_response(&mut store, values) {
                                Ok(_) => render_new_messages(&store, &mut printed),
                                Err(err) => println!("{err}"),
                            },
                            None => println!("Usage: /filter name=value ..."),
                        }
                    } else if command.is_entities() {
                        print_entities(&store);
                    } else if command.is_select() {
                        if command.args.len() == 1 && command.args[0] == "clear" {
                            store.clear_selected_entities();
                        } else if command.args.len() < 2 {
                            println!("Usage: /select TYPE NAME (or /select clear)");
                        } else {
                            let entity_type = command.args[0].to_string();
                            let name = command.args[1..].join(" ");
                            store.toggle_selected_entity(&name, &entity_type);
                        }
                    } else if command.is_chart() {
                        handle_chart_command(&command, &mut store, &charts).await;
                    } else if command.is_result() {
                        match command.args.first() {
                            Some(target) => print_result(&store, target),
                            None => println!("Usage: /result MESSAGE_ID"),
                        }
                    }
                    continue;
                }

                if store.pending {
                    println!("A request is already in flight. /cancel it first.");
                    continue;
                }

                match service.send_query(&mut store, text) {
                    Ok(_) => render_new_messages(&store, &mut printed),
                    Err(err) => println!("{err}"),
                }
            }
        }
    }

    socket.disconnect();
    return Ok(());
}
