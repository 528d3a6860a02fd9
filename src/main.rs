//! chat-list demo: one conversation window fed by a simulated peer.
//!
//! Architecture:
//! - Main thread: runs the egui UI and owns the `MessageContainer`
//! - Feed thread: produces incoming messages and older history pages
//! - Communication via crossbeam channels (lock-free, sync-safe)

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use eframe::egui;

use chat_list::config::{self, ListSettings};
use chat_list::logging;
use chat_list::ui::ChatTheme;
use chat_list::{ContainerProps, Message, MessageContainer, ScrollTo, User};

const ME: i64 = 1;
const PEER: i64 = 2;
const HISTORY_PAGES: usize = 3;
const PAGE_LEN: usize = 15;

/// Requests sent from the UI to the feed
#[derive(Debug, Clone)]
enum FeedAction {
    /// The viewer sent a message; the peer may answer it
    Sent(String),
    /// Fetch the next page of older messages
    LoadEarlier,
}

/// Events sent from the feed to the UI
#[derive(Debug, Clone)]
enum FeedEvent {
    Incoming(Message),
    Typing(bool),
    /// Older messages, newest first
    Earlier { messages: Vec<Message>, more: bool },
}

fn peer() -> User {
    User::new(PEER, "Robin")
}

fn me() -> User {
    User::new(ME, "You")
}

/// Synthetic history page `page` (0 = most recent), ids counting down.
fn history_page(page: usize) -> Vec<Message> {
    let now = Utc::now();
    (0..PAGE_LEN)
        .map(|i| {
            let n = page * PAGE_LEN + i;
            let author = if n % 3 == 0 { me() } else { peer() };
            let id = format!("h-{}", n);
            Message::new(id, format!("Older message #{}", n), author)
                .with_created_at(now - chrono::Duration::minutes(20 * (n as i64 + 1)))
        })
        .collect()
}

fn run_feed(actions: Receiver<FeedAction>, events: Sender<FeedEvent>) {
    let mut next_id = 0u64;
    let mut pages_sent = 1;
    let mut incoming = |text: String| {
        next_id += 1;
        Message::new(format!("peer-{}", next_id), text, peer())
    };

    loop {
        match actions.recv_timeout(Duration::from_secs(6)) {
            Ok(FeedAction::Sent(text)) => {
                let _ = events.send(FeedEvent::Typing(true));
                thread::sleep(Duration::from_millis(900));
                let _ = events.send(FeedEvent::Typing(false));
                let reply = if text.contains("http") {
                    "Thanks for the link!".to_string()
                } else {
                    format!("You said: {}", text)
                };
                if events.send(FeedEvent::Incoming(incoming(reply))).is_err() {
                    break;
                }
            }
            Ok(FeedAction::LoadEarlier) => {
                thread::sleep(Duration::from_millis(600));
                let messages = history_page(pages_sent);
                pages_sent += 1;
                let more = pages_sent < HISTORY_PAGES;
                if events.send(FeedEvent::Earlier { messages, more }).is_err() {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                let text = "Still there? Docs live at https://docs.rs".to_string();
                if events.send(FeedEvent::Incoming(incoming(text))).is_err() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    tracing::debug!("feed thread exiting");
}

struct DemoApp {
    container: MessageContainer,
    /// Newest first.
    messages: Vec<Message>,
    draft: String,
    sent_count: u64,
    actions: Sender<FeedAction>,
    events: Receiver<FeedEvent>,
}

impl DemoApp {
    fn new(cc: &eframe::CreationContext<'_>, settings: ListSettings) -> Self {
        let theme = ChatTheme::from_name(&settings.theme);
        cc.egui_ctx.set_visuals(if theme.name == "Light" {
            egui::Visuals::light()
        } else {
            egui::Visuals::dark()
        });
        tracing::info!(theme = %theme.name, "starting demo");

        let (action_tx, action_rx) = unbounded::<FeedAction>();
        let (event_tx, event_rx) = unbounded::<FeedEvent>();
        thread::spawn(move || run_feed(action_rx, event_tx));

        let loader = action_tx.clone();
        let messages = history_page(0);
        let props = ContainerProps {
            load_earlier: true,
            on_load_earlier: Some(Arc::new(move || {
                let _ = loader.send(FeedAction::LoadEarlier);
            })),
            ..ContainerProps::new(messages.clone(), me())
        };

        Self {
            container: MessageContainer::new(props, settings),
            messages,
            draft: String::new(),
            sent_count: 0,
            actions: action_tx,
            events: event_rx,
        }
    }

    fn process_events(&mut self) -> Option<ContainerProps> {
        let mut next = None;
        while let Ok(event) = self.events.try_recv() {
            let base = next.take().unwrap_or_else(|| self.container.props().clone());
            next = Some(match event {
                FeedEvent::Incoming(msg) => {
                    self.messages.insert(0, msg);
                    base.with_messages(self.messages.clone())
                }
                FeedEvent::Earlier { messages, more } => {
                    self.messages.extend(messages);
                    ContainerProps {
                        load_earlier: more,
                        is_loading_earlier: false,
                        ..base.with_messages(self.messages.clone())
                    }
                }
                FeedEvent::Typing(true) => ContainerProps {
                    render_footer: Some(Arc::new(|ui: &mut egui::Ui, _: &ContainerProps| {
                        ui.add_space(4.0);
                        ui.label(egui::RichText::new("Robin is typing…").italics().weak());
                    })),
                    ..base
                },
                FeedEvent::Typing(false) => ContainerProps {
                    render_footer: None,
                    ..base
                },
            });
        }
        next
    }

    fn send_draft(&mut self) -> Option<ContainerProps> {
        let text = self.draft.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.draft.clear();
        self.sent_count += 1;
        self.messages
            .insert(0, Message::new(format!("me-{}", self.sent_count), text.clone(), me()));
        let _ = self.actions.send(FeedAction::Sent(text));
        self.container.scroll_to(ScrollTo::newest());
        Some(self.container.props().with_messages(self.messages.clone()))
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut next = self.process_events();

        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let input = ui.add(
                    egui::TextEdit::singleline(&mut self.draft)
                        .hint_text("Type a message…")
                        .desired_width(ui.available_width() - 140.0),
                );
                let enter = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Send").clicked() || enter {
                    if let Some(props) = self.send_draft() {
                        next = Some(props);
                    }
                    input.request_focus();
                }
                if ui.button("Newest").clicked() {
                    self.container.scroll_to(ScrollTo::newest());
                }
            });
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let response = self.container.show(ui);
            if response.load_earlier_clicked {
                next = Some(ContainerProps {
                    is_loading_earlier: true,
                    ..self.container.props().clone()
                });
            }
        });

        if let Some(props) = next {
            if self.container.update(props) {
                ctx.request_repaint();
            }
        }

        // Keep polling the feed
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

fn main() -> eframe::Result<()> {
    logging::init_logging();
    let settings = config::load_settings();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 640.0])
            .with_min_inner_size([320.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "chat-list demo",
        options,
        Box::new(move |cc| Ok(Box::new(DemoApp::new(cc, settings)))),
    )
}
