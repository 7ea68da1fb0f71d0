//! pokelist - browse and search the PokeAPI catalog in the terminal

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tracing::{error, info, warn};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_components::centered_rect;
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokelist::action::Action;
use pokelist::api::CatalogClient;
use pokelist::components::{CatalogView, CatalogViewProps, Component};
use pokelist::config::{
    API_BASE, BrowseSettings, ClientConfig, IMAGE_HOST, INDEX_PAGE_SIZE, REQUEST_TIMEOUT_SECS,
    SEARCH_CAP, SEARCH_DEBOUNCE_MS,
};
use pokelist::effect::Effect;
use pokelist::logging;
use pokelist::reducer::reducer;
use pokelist::state::AppState;
use pokelist::tasks;

static CLIENT: OnceLock<CatalogClient> = OnceLock::new();

/// Scrollable, searchable PokeAPI catalog browser
#[derive(Parser, Debug)]
#[command(name = "pokelist")]
#[command(about = "Browse, search and inspect the PokeAPI catalog")]
struct Args {
    /// Catalog API base URL
    #[arg(long, default_value = API_BASE)]
    api_base: String,

    /// Base URL of the sprite image host
    #[arg(long, default_value = IMAGE_HOST)]
    image_host: String,

    /// Primary list page size [default: 1000, or 20 with --bare]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,

    /// Page size used while building the search index
    #[arg(long, default_value_t = INDEX_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    index_page_size: u32,

    /// Stop a search pass once it holds more than this many results
    #[arg(long, default_value_t = SEARCH_CAP)]
    search_cap: usize,

    /// Quiet period before search text is applied, in milliseconds
    #[arg(long, default_value_t = SEARCH_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Minimal list screen: pagination only, no search or details
    #[arg(long)]
    bare: bool,

    /// Log file [default: <cache dir>/pokelist/pokelist.log]
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    debug: DebugCliArgs,
}

impl Args {
    fn settings(&self) -> BrowseSettings {
        let base = if self.bare {
            BrowseSettings::bare()
        } else {
            BrowseSettings::default()
        };
        BrowseSettings {
            page_size: self.page_size.unwrap_or(base.page_size),
            index_page_size: self.index_page_size,
            search_cap: self.search_cap,
            debounce_ms: self.debounce_ms,
            ..base
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base: self.api_base.trim_end_matches('/').to_string(),
            image_host: self.image_host.trim_end_matches('/').to_string(),
            user_agent: Some(format!("pokelist/{}", env!("CARGO_PKG_VERSION"))),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum ListComponentId {
    List,
    Search,
    Detail,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum ListContext {
    List,
    Search,
    Detail,
}

impl EventRoutingState<ListComponentId, ListContext> for AppState {
    fn focused(&self) -> Option<ListComponentId> {
        if self.selected.is_some() {
            Some(ListComponentId::Detail)
        } else if self.search.active {
            Some(ListComponentId::Search)
        } else {
            Some(ListComponentId::List)
        }
    }

    fn modal(&self) -> Option<ListComponentId> {
        if self.selected.is_some() {
            Some(ListComponentId::Detail)
        } else if self.search.active {
            Some(ListComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: ListComponentId) -> ListContext {
        match id {
            ListComponentId::List => ListContext::List,
            ListComponentId::Search => ListContext::Search,
            ListComponentId::Detail => ListContext::Detail,
        }
    }

    fn default_context(&self) -> ListContext {
        ListContext::List
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    let log_path = logging::init_logger(args.log_file.clone(), args.verbose)?;
    let settings = args.settings();
    let config = args.client_config();
    info!(
        api_base = %config.api_base,
        page_size = settings.page_size,
        bare = settings.bare,
        log = ?log_path,
        "starting"
    );

    let client = CatalogClient::new(config).map_err(io::Error::other)?;
    if CLIENT.set(client).is_err() {
        warn!("catalog client already initialised");
    }

    let debug = DebugSession::new(args.debug);

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(settings))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    info!("exiting");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

struct ListUi {
    view: CatalogView,
}

impl ListUi {
    fn new() -> Self {
        Self {
            view: CatalogView::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<ListComponentId>,
    ) {
        event_ctx.set_component_area(ListComponentId::List, area);
        event_ctx.set_component_area(
            ListComponentId::Search,
            Rect {
                height: area.height.min(3),
                ..area
            },
        );
        if state.selected.is_some() {
            event_ctx.set_component_area(ListComponentId::Detail, centered_rect(50, 22, area));
        } else {
            event_ctx
                .component_areas
                .remove(&ListComponentId::Detail);
        }

        let props = CatalogViewProps {
            state,
            is_focused: render_ctx.is_focused(),
        };
        self.view.render(frame, area, props);
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(ListUi::new()));
    let mut bus: EventBus<AppState, Action, ListComponentId, ListContext> = EventBus::new();
    let keybindings: Keybindings<ListContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(ListComponentId::List, move |event, state| {
        handler_response(ui_list.borrow_mut().view.handle_list_event(&event.kind, state))
    });

    let ui_search = Rc::clone(&ui);
    bus.register(ListComponentId::Search, move |event, state| {
        let actions = ui_search
            .borrow_mut()
            .view
            .handle_search_event(&event.kind, state);
        // the input is modal; swallow everything while editing
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(ListComponentId::Detail, move |event, state| {
        let actions = ui_detail
            .borrow_mut()
            .view
            .handle_detail_event(&event.kind, state);
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    });

    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        EventKind::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            HandlerResponse::action(Action::Quit)
        }
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

/// Handle effects by spawning tasks
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    let Some(client) = CLIENT.get() else {
        error!(?effect, "catalog client not initialised");
        return;
    };
    match effect {
        Effect::LoadIndex { page_size } => {
            ctx.tasks()
                .spawn(TaskKey::new("index"), tasks::load_index(client, page_size));
        }
        Effect::LoadPage {
            limit,
            offset,
            append,
        } => {
            ctx.tasks().spawn(
                TaskKey::new("page"),
                tasks::load_page(client, limit, offset, append),
            );
        }
        Effect::SettleSearch { text, delay } => {
            ctx.tasks()
                .debounce("search_settle", delay, async move {
                    Action::SearchDidSettle(text)
                });
        }
        Effect::RunSearch {
            generation,
            candidates,
            cap,
        } => {
            ctx.tasks().spawn(TaskKey::new("search_pass"), async move {
                tasks::run_search(client, generation, &candidates, cap).await
            });
        }
        Effect::LoadDetail { url } => {
            ctx.tasks()
                .spawn(TaskKey::new("detail"), tasks::load_detail(client, url));
        }
        Effect::LoadSprite { id } => {
            ctx.tasks()
                .spawn(TaskKey::new("sprite"), tasks::load_sprite(client, id));
        }
        Effect::LoadSpriteAt { id, url } => {
            ctx.tasks()
                .spawn(TaskKey::new("sprite"), tasks::load_sprite_at(client, id, url));
        }
    }
}
