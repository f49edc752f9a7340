// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use catdesk_app::{
    CATEGORIES_QUERY, Category, CategoryCommand, CategoryEvent, CategoryFormInput, CategoryId,
    CategoryListState, CollectionProvider, CollectionSnapshot, DeleteOutcome, DrawerMode,
    FormBuilderPanel, ListTab, Notification, Notifier, NotifyVariant, QueryCache,
    apply_delete_outcome, empty_list_message, filter_categories, handle_mutation_success,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::collections::BTreeMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::macros::format_description;

const DRAWER_FIELDS: [&str; 4] = ["Title", "Description", "Icon", "Color"];
const LOADING_MESSAGE: &str = "Loading categories...";
const LOAD_FAILED_MESSAGE: &str = "Could not load categories. Press r to retry.";
const CONFIRM_TITLE: &str = "Are you absolutely sure?";
const NO_SELECTION_HINT: &str = "select a category first (c on a row)";
const CURSOR_MARK: &str = "█";

pub trait AppRuntime {
    fn load_categories(&mut self) -> Result<Vec<Category>>;
    fn submit_drawer(&mut self, mode: &DrawerMode, input: &CategoryFormInput) -> Result<Category>;
    fn delete_category(&mut self, id: &CategoryId) -> Result<()>;
    fn form_builder(&self) -> &dyn FormBuilderPanel;
    fn spawn_delete(
        &mut self,
        request_id: u64,
        id: CategoryId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.delete_category(&id);
        let outcome = DeleteOutcome::from_result(id, result);
        tx.send(InternalEvent::DeleteFinished {
            request_id,
            outcome,
        })
        .map_err(|_| anyhow!("delete event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    DeleteFinished {
        request_id: u64,
        outcome: DeleteOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DrawerUiState {
    mode: DrawerMode,
    fields: [String; 4],
    field_index: usize,
}

impl DrawerUiState {
    fn create() -> Self {
        Self::from_input(DrawerMode::Create, &CategoryFormInput::blank())
    }

    fn edit(category: &Category) -> Self {
        Self::from_input(
            DrawerMode::Edit(category.id.clone()),
            &CategoryFormInput::from_category(category),
        )
    }

    fn from_input(mode: DrawerMode, input: &CategoryFormInput) -> Self {
        Self {
            mode,
            fields: [
                input.title.clone(),
                input.description.clone().unwrap_or_default(),
                input.icon_name.clone(),
                input.color.clone(),
            ],
            field_index: 0,
        }
    }

    fn input(&self) -> CategoryFormInput {
        CategoryFormInput::from_fields(
            &self.fields[0],
            &self.fields[1],
            &self.fields[2],
            &self.fields[3],
        )
    }

    fn active_field_mut(&mut self) -> &mut String {
        &mut self.fields[self.field_index]
    }

    fn move_field(&mut self, delta: isize) {
        let len = DRAWER_FIELDS.len() as isize;
        self.field_index = (self.field_index as isize + delta).rem_euclid(len) as usize;
    }

    fn close_command(&self) -> CategoryCommand {
        match self.mode {
            DrawerMode::Create => CategoryCommand::CloseCreateDrawer,
            DrawerMode::Edit(_) => CategoryCommand::CloseEditDrawer,
        }
    }
}

#[derive(Debug, Clone)]
struct ViewData {
    cache: QueryCache,
    cursor: usize,
    search_editing: bool,
    drawer: Option<DrawerUiState>,
    confirm_delete: Option<Category>,
    pending_deletes: BTreeMap<u64, CategoryId>,
    next_request_id: u64,
    help_visible: bool,
    status_token: u64,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            cache: QueryCache::new(CATEGORIES_QUERY),
            cursor: 0,
            search_editing: false,
            drawer: None,
            confirm_delete: None,
            pending_deletes: BTreeMap::new(),
            next_request_id: 0,
            help_visible: false,
            status_token: 0,
        }
    }
}

/// Routes notifications to the status line and schedules their expiry.
struct StatusNotifier<'a> {
    state: &'a mut CategoryListState,
    status_token: &'a mut u64,
    tx: &'a Sender<InternalEvent>,
}

impl Notifier for StatusNotifier<'_> {
    fn notify(&mut self, notification: Notification) {
        self.state.dispatch(CategoryCommand::Notify(notification));
        *self.status_token = self.status_token.saturating_add(1);
        schedule_status_clear(self.tx, *self.status_token);
    }
}

pub fn run_app<R: AppRuntime>(state: &mut CategoryListState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);
        refresh_categories(state, runtime, &mut view_data, &internal_tx);

        let panel = runtime.form_builder();
        if let Err(error) = terminal.draw(|frame| render(frame, state, panel, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(CategoryCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::DeleteFinished {
                request_id,
                outcome,
            } => finish_delete(state, view_data, tx, request_id, &outcome),
        }
    }
}

fn finish_delete(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request_id: u64,
    outcome: &DeleteOutcome,
) {
    // Deletes cannot be canceled, so late outcomes still count.
    match view_data.pending_deletes.remove(&request_id) {
        Some(expected) if &expected != outcome.id() => tracing::warn!(
            request_id,
            expected = %expected,
            category_id = %outcome.id(),
            "delete outcome names a different category than requested"
        ),
        Some(_) => {}
        None => tracing::debug!(
            request_id,
            category_id = %outcome.id(),
            "delete outcome arrived for untracked request"
        ),
    }

    let ViewData {
        cache,
        status_token,
        ..
    } = view_data;
    let mut notifier = StatusNotifier {
        state,
        status_token,
        tx,
    };
    apply_delete_outcome(outcome, cache, &mut notifier);
}

fn refresh_categories<R: AppRuntime>(
    state: &mut CategoryListState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if !view_data.cache.is_stale() {
        return;
    }
    match view_data.cache.refresh_with(|| runtime.load_categories()) {
        Ok(false) => {}
        Ok(true) => {
            sync_selected_category(state, view_data, tx);
            clamp_cursor(state, view_data);
        }
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "category load failed");
            // The cache stays stale while it still has retries left.
            let next = if view_data.cache.is_stale() {
                "retrying"
            } else {
                "press r to retry"
            };
            emit_status(state, view_data, tx, format!("load failed: {error:#} -- {next}"));
        }
    }
}

/// Swaps the selection for its freshly loaded copy. A form builder whose
/// category vanished from the backend falls back to the list.
fn sync_selected_category(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let Some(selected) = &state.selected_category else {
        return;
    };
    match view_data.cache.items().iter().find(|row| row.id == selected.id) {
        Some(fresh) => {
            if fresh != selected {
                state.selected_category = Some(fresh.clone());
            }
        }
        None if state.active_tab == ListTab::FormBuilder && !state.drawer_open() => {
            let title = selected.title.clone();
            tracing::info!(category = %title, "selected category is gone; returning to list");
            dispatch(state, view_data, tx, CategoryCommand::ReturnToList);
            emit_status(
                state,
                view_data,
                tx,
                format!("category \"{title}\" no longer exists"),
            );
        }
        None => {}
    }
}

fn reload(state: &mut CategoryListState, view_data: &mut ViewData, tx: &Sender<InternalEvent>) {
    view_data.cache.invalidate(CATEGORIES_QUERY);
    emit_status(state, view_data, tx, "refreshing categories");
}

fn visible_rows<'a>(state: &CategoryListState, view_data: &'a ViewData) -> Vec<&'a Category> {
    filter_categories(view_data.cache.items(), &state.search_query)
}

fn current_row(state: &CategoryListState, view_data: &ViewData) -> Option<Category> {
    visible_rows(state, view_data)
        .get(view_data.cursor)
        .map(|row| (*row).clone())
}

fn clamp_cursor(state: &CategoryListState, view_data: &mut ViewData) {
    let len = visible_rows(state, view_data).len();
    view_data.cursor = view_data.cursor.min(len.saturating_sub(1));
}

fn move_cursor(state: &CategoryListState, view_data: &mut ViewData, delta: isize) {
    let len = visible_rows(state, view_data).len();
    if len == 0 {
        view_data.cursor = 0;
        return;
    }
    let next = (view_data.cursor as isize + delta).clamp(0, len as isize - 1);
    view_data.cursor = next as usize;
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn notify(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notification: Notification,
) {
    let mut notifier = StatusNotifier {
        state,
        status_token: &mut view_data.status_token,
        tx: internal_tx,
    };
    notifier.notify(notification);
}

fn emit_status(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    notify(
        state,
        view_data,
        internal_tx,
        Notification::info("", message),
    );
}

fn dispatch(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: CategoryCommand,
) -> Vec<CategoryEvent> {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, CategoryEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
    events
}

fn handle_key_event<R: AppRuntime>(
    state: &mut CategoryListState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.confirm_delete.is_some() {
        handle_confirm_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.drawer.is_some() {
        handle_drawer_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.search_editing {
        handle_search_key(state, view_data, internal_tx, key);
        return false;
    }

    match state.active_tab {
        ListTab::List => handle_list_key(state, view_data, internal_tx, key),
        ListTab::FormBuilder => handle_form_builder_key(state, view_data, internal_tx, key),
    }
}

fn handle_list_key(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('?'), _) => view_data.help_visible = true,
        (KeyCode::Char('/'), KeyModifiers::NONE) => view_data.search_editing = true,
        (KeyCode::Char('j') | KeyCode::Down, _) => move_cursor(state, view_data, 1),
        (KeyCode::Char('k') | KeyCode::Up, _) => move_cursor(state, view_data, -1),
        (KeyCode::Char('g'), KeyModifiers::NONE) => view_data.cursor = 0,
        (KeyCode::Char('G'), _) => {
            view_data.cursor = visible_rows(state, view_data).len().saturating_sub(1);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => reload(state, view_data, internal_tx),
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            dispatch(state, view_data, internal_tx, CategoryCommand::OpenCreateDrawer);
            view_data.drawer = Some(DrawerUiState::create());
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => match current_row(state, view_data) {
            Some(row) => open_edit_drawer(state, view_data, internal_tx, row),
            None => emit_status(state, view_data, internal_tx, "no category to edit"),
        },
        (KeyCode::Char('c') | KeyCode::Enter, _) => match current_row(state, view_data) {
            Some(row) => {
                dispatch(
                    state,
                    view_data,
                    internal_tx,
                    CategoryCommand::SelectForFormBuilder(row),
                );
            }
            None => emit_status(state, view_data, internal_tx, "no category to configure"),
        },
        (KeyCode::Char('d'), KeyModifiers::NONE) => match current_row(state, view_data) {
            Some(row) => view_data.confirm_delete = Some(row),
            None => emit_status(state, view_data, internal_tx, "no category to delete"),
        },
        (KeyCode::Tab, _) => switch_tab(state, view_data, internal_tx),
        (KeyCode::Esc, _) if !state.search_query.is_empty() => {
            set_search(state, view_data, internal_tx, String::new());
        }
        _ => {}
    }
    false
}

fn handle_form_builder_key(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('?'), _) => view_data.help_visible = true,
        (KeyCode::Esc | KeyCode::Char('b'), _) => {
            dispatch(state, view_data, internal_tx, CategoryCommand::ReturnToList);
            clamp_cursor(state, view_data);
        }
        (KeyCode::Tab, _) => switch_tab(state, view_data, internal_tx),
        (KeyCode::Char('r'), KeyModifiers::NONE) => reload(state, view_data, internal_tx),
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            if let Some(selected) = state.selected_category.clone() {
                open_edit_drawer(state, view_data, internal_tx, selected);
            }
        }
        _ => {}
    }
    false
}

fn handle_search_key(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => view_data.search_editing = false,
        KeyCode::Backspace => {
            let mut query = state.search_query.clone();
            if query.pop().is_some() {
                set_search(state, view_data, internal_tx, query);
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut query = state.search_query.clone();
            query.push(ch);
            set_search(state, view_data, internal_tx, query);
        }
        _ => {}
    }
}

fn set_search(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    query: String,
) {
    dispatch(state, view_data, internal_tx, CategoryCommand::SetSearch(query));
    view_data.cursor = 0;
}

fn switch_tab(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let next = match state.active_tab {
        ListTab::List => ListTab::FormBuilder,
        ListTab::FormBuilder => ListTab::List,
    };
    dispatch(state, view_data, internal_tx, CategoryCommand::SwitchTab(next));
}

fn open_edit_drawer(
    state: &mut CategoryListState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    category: Category,
) {
    view_data.drawer = Some(DrawerUiState::edit(&category));
    dispatch(
        state,
        view_data,
        internal_tx,
        CategoryCommand::SelectForEdit(category),
    );
}

fn handle_drawer_key<R: AppRuntime>(
    state: &mut CategoryListState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(mut drawer) = view_data.drawer.take() else {
        return;
    };

    match key.code {
        KeyCode::Esc => {
            dispatch(state, view_data, internal_tx, drawer.close_command());
            return;
        }
        KeyCode::Enter => {
            if submit_drawer(state, runtime, view_data, internal_tx, &drawer) {
                return;
            }
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if submit_drawer(state, runtime, view_data, internal_tx, &drawer) {
                return;
            }
        }
        KeyCode::Tab | KeyCode::Down => drawer.move_field(1),
        KeyCode::BackTab | KeyCode::Up => drawer.move_field(-1),
        KeyCode::Backspace => {
            drawer.active_field_mut().pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            drawer.active_field_mut().push(ch);
        }
        _ => {}
    }
    view_data.drawer = Some(drawer);
}

/// Validates and saves the drawer. Returns whether the drawer closed.
fn submit_drawer<R: AppRuntime>(
    state: &mut CategoryListState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    drawer: &DrawerUiState,
) -> bool {
    let input = drawer.input();
    if let Err(error) = input.validate() {
        emit_status(state, view_data, internal_tx, error.to_string());
        return false;
    }

    match runtime.submit_drawer(&drawer.mode, &input) {
        Ok(saved) => {
            tracing::info!(
                category_id = %saved.id,
                edit = drawer.mode.is_edit(),
                "category saved"
            );
            handle_mutation_success(&mut view_data.cache);
            dispatch(state, view_data, internal_tx, drawer.close_command());
            let verb = if drawer.mode.is_edit() {
                "updated"
            } else {
                "created"
            };
            notify(
                state,
                view_data,
                internal_tx,
                Notification::info("Success", format!("Category {verb} successfully")),
            );
            true
        }
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "category save failed");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("save failed: {error:#}"),
            );
            false
        }
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut CategoryListState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(category) = view_data.confirm_delete.take() else {
        return;
    };
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            request_delete(state, runtime, view_data, internal_tx, &category);
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            emit_status(state, view_data, internal_tx, "delete canceled");
        }
        _ => view_data.confirm_delete = Some(category),
    }
}

fn request_delete<R: AppRuntime>(
    state: &mut CategoryListState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    category: &Category,
) {
    view_data.next_request_id = view_data.next_request_id.saturating_add(1);
    let request_id = view_data.next_request_id;
    view_data
        .pending_deletes
        .insert(request_id, category.id.clone());
    tracing::info!(category_id = %category.id, request_id, "delete requested");

    if let Err(error) = runtime.spawn_delete(request_id, category.id.clone(), internal_tx.clone())
    {
        view_data.pending_deletes.remove(&request_id);
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("delete could not start: {error:#}"),
        );
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    state: &CategoryListState,
    panel: &dyn FormBuilderPanel,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let tabs = state.visible_tabs();
    let selected = tabs
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let (action_key, action_label) = header_action(state);
    let header = Tabs::new(tabs.iter().map(|tab| tab.label()).collect::<Vec<_>>())
        .block(
            Block::default()
                .title("catdesk")
                .title_top(Line::from(format!("{action_key} {action_label}")).right_aligned())
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(header, layout[0]);

    match state.active_tab {
        ListTab::List => render_list(frame, layout[1], state, view_data),
        ListTab::FormBuilder => {
            let body = Paragraph::new(form_builder_text(state, panel)).block(
                Block::default()
                    .title(ListTab::FormBuilder.label())
                    .borders(Borders::ALL),
            );
            frame.render_widget(body, layout[1]);
        }
    }

    let status_color = match &state.status_line {
        Some(note) if note.variant == NotifyVariant::Destructive => Color::Red,
        _ => Color::Yellow,
    };
    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(drawer) = &view_data.drawer {
        let area = drawer_rect(layout[1]);
        frame.render_widget(Clear, area);
        let body = Paragraph::new(drawer_text(drawer)).block(
            Block::default()
                .title(drawer.mode.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(body, area);
    }

    if let Some(category) = &view_data.confirm_delete {
        let area = centered_rect(56, 30, frame.area());
        frame.render_widget(Clear, area);
        let dialog = Paragraph::new(confirm_text(category)).block(
            Block::default()
                .title("delete")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(dialog, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_list(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &CategoryListState,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let search = Paragraph::new(search_text(state, view_data.search_editing))
        .block(Block::default().title("search").borders(Borders::ALL));
    frame.render_widget(search, layout[0]);

    let snapshot = view_data.cache.snapshot();
    if let Some(message) =
        list_placeholder(&snapshot, view_data.cache.has_failed(), &state.search_query)
    {
        let body = Paragraph::new(message).block(
            Block::default()
                .title(ListTab::List.label())
                .borders(Borders::ALL),
        );
        frame.render_widget(body, layout[1]);
        return;
    }

    let rows = filter_categories(&snapshot.items, &state.search_query);
    let header = Row::new(["Title", "Description", "Count", ""].map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let body_rows = rows.iter().enumerate().map(|(index, row)| {
        let selected = index == view_data.cursor;
        let base = if selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let actions = if selected {
            "c Configure Form | e Edit | d Delete"
        } else {
            ""
        };
        Row::new([
            Cell::from(title_cell_text(row)).style(base.fg(color_for(&row.color))),
            Cell::from(row.description_text().to_owned()).style(base),
            Cell::from(count_cell_text(row)).style(base),
            Cell::from(actions).style(base.fg(Color::Cyan)),
        ])
    });

    let widths = [
        Constraint::Percentage(28),
        Constraint::Percentage(38),
        Constraint::Length(7),
        Constraint::Min(20),
    ];
    let table = Table::new(body_rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!(
                    "{} ({}/{})",
                    ListTab::List.label(),
                    rows.len(),
                    snapshot.items.len()
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, layout[1]);
}

/// Text shown instead of the table, if any.
fn list_placeholder(
    snapshot: &CollectionSnapshot,
    load_failed: bool,
    query: &str,
) -> Option<&'static str> {
    if snapshot.is_loading {
        return Some(LOADING_MESSAGE);
    }
    if load_failed && snapshot.items.is_empty() {
        return Some(LOAD_FAILED_MESSAGE);
    }
    if filter_categories(&snapshot.items, query).is_empty() {
        return Some(empty_list_message(query));
    }
    None
}

fn header_action(state: &CategoryListState) -> (&'static str, &'static str) {
    match state.active_tab {
        ListTab::List => ("a", "Add Category"),
        ListTab::FormBuilder => ("esc", "Back to Categories"),
    }
}

fn search_text(state: &CategoryListState, editing: bool) -> String {
    if editing {
        return format!("{}{CURSOR_MARK}", state.search_query);
    }
    if state.search_query.is_empty() {
        return "Search categories... (/)".to_owned();
    }
    state.search_query.clone()
}

/// Blank when the backend sent no count; zero would claim an empty category.
fn count_cell_text(category: &Category) -> String {
    category.count.map(|count| count.to_string()).unwrap_or_default()
}

fn title_cell_text(category: &Category) -> String {
    let glyph = category.glyph();
    if glyph.is_empty() {
        category.title.clone()
    } else {
        format!("{glyph} {}", category.title)
    }
}

fn form_builder_text(state: &CategoryListState, panel: &dyn FormBuilderPanel) -> String {
    let Some(category) = &state.selected_category else {
        return NO_SELECTION_HINT.to_owned();
    };

    let mut lines = vec![title_cell_text(category)];
    if !category.description_text().is_empty() {
        lines.push(category.description_text().to_owned());
    }
    if let Some(created_at) = category.created_at
        && let Ok(date) = created_at.format(format_description!("[year]-[month]-[day]"))
    {
        lines.push(format!("created {date}"));
    }
    lines.push(String::new());
    lines.extend(panel.render_lines(&category.id));
    lines.join("\n")
}

fn drawer_text(drawer: &DrawerUiState) -> String {
    let mut lines = DRAWER_FIELDS
        .iter()
        .zip(&drawer.fields)
        .enumerate()
        .map(|(index, (label, value))| {
            if index == drawer.field_index {
                format!("> {label}: {value}{CURSOR_MARK}")
            } else {
                format!("  {label}: {value}")
            }
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push("enter save | esc cancel".to_owned());
    lines.join("\n")
}

fn confirm_text(category: &Category) -> String {
    format!(
        "{CONFIRM_TITLE}\n\nThis action cannot be undone. This will permanently delete the category \"{}\".\n\ny delete | n cancel",
        category.title
    )
}

fn status_text(state: &CategoryListState, view_data: &ViewData) -> String {
    let (mode, hints) = if view_data.confirm_delete.is_some() {
        ("CONFIRM", "y delete | n cancel")
    } else if view_data.drawer.is_some() {
        (
            "DRAWER",
            "tab/shift+tab field | enter or ctrl+s save | esc cancel",
        )
    } else if view_data.search_editing {
        ("SEARCH", "type to filter | enter/esc done")
    } else {
        match state.active_tab {
            ListTab::List => (
                "LIST",
                "j/k move | / search | a add | e edit | c form | d delete | r refresh | tab | ? help | q quit",
            ),
            ListTab::FormBuilder => (
                "FORM",
                "esc back | e edit | r refresh | tab | ? help | q quit",
            ),
        }
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {} | {hints}", status.display()),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
list: j/k move | g/G first/last | / search | esc clear search | tab switch tab\n\
list: a add | e edit | c or enter configure form | d delete | r refresh\n\
form builder: esc or b back to categories | e edit category | r refresh\n\
drawer: tab/shift+tab field | enter or ctrl+s save | esc cancel\n\
delete: y or enter confirm | n or esc cancel"
}

/// Terminal color for a `#rrggbb` string. Anything else keeps the default color.
fn color_for(raw: &str) -> Color {
    let Some(hex) = raw.trim().strip_prefix('#') else {
        return Color::Reset;
    };
    if hex.len() != 6 || !hex.is_ascii() {
        return Color::Reset;
    }
    let channel = |offset: usize| u8::from_str_radix(&hex[offset..offset + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(red), Some(green), Some(blue)) => Color::Rgb(red, green, blue),
        _ => Color::Reset,
    }
}

fn drawer_rect(area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area)[1]
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, LOAD_FAILED_MESSAGE, LOADING_MESSAGE, NO_SELECTION_HINT,
        ViewData, color_for, confirm_text, count_cell_text, drawer_text, form_builder_text,
        handle_key_event, header_action, help_overlay_text, list_placeholder,
        process_internal_events, refresh_categories, status_text, title_cell_text,
    };
    use anyhow::{Result, anyhow, bail};
    use catdesk_app::{
        Category, CategoryFormInput, CategoryId, CategoryListState, CollectionProvider,
        DELETE_FALLBACK_MESSAGE, DrawerMode, EMPTY_LIST_MESSAGE, EMPTY_SEARCH_MESSAGE,
        FormBuilderPanel, ListTab, MAX_FETCH_ATTEMPTS, NotifyVariant,
    };
    use catdesk_testkit::category;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::style::Color;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::{Duration, Instant};

    struct StaticPanel;

    impl FormBuilderPanel for StaticPanel {
        fn render_lines(&self, category_id: &CategoryId) -> Vec<String> {
            vec![format!("fields for {category_id}")]
        }
    }

    struct TestRuntime {
        rows: Vec<Category>,
        load_count: usize,
        load_error: Option<String>,
        delete_error: Option<String>,
        deleted: Vec<CategoryId>,
        submitted: Vec<(DrawerMode, CategoryFormInput)>,
        submit_error: Option<String>,
        panel: StaticPanel,
    }

    impl TestRuntime {
        fn with_rows(rows: Vec<Category>) -> Self {
            Self {
                rows,
                load_count: 0,
                load_error: None,
                delete_error: None,
                deleted: Vec::new(),
                submitted: Vec::new(),
                submit_error: None,
                panel: StaticPanel,
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn load_categories(&mut self) -> Result<Vec<Category>> {
            self.load_count += 1;
            if let Some(error) = &self.load_error {
                bail!("{error}");
            }
            Ok(self.rows.clone())
        }

        fn submit_drawer(
            &mut self,
            mode: &DrawerMode,
            input: &CategoryFormInput,
        ) -> Result<Category> {
            if let Some(error) = &self.submit_error {
                bail!("{error}");
            }
            self.submitted.push((mode.clone(), input.clone()));
            let id = match mode {
                DrawerMode::Create => CategoryId::new(format!("new-{}", self.submitted.len())),
                DrawerMode::Edit(id) => id.clone(),
            };
            let saved = Category {
                id: id.clone(),
                title: input.title.clone(),
                description: input.description.clone(),
                icon_name: input.icon_name.clone(),
                color: input.color.clone(),
                count: Some(0),
                created_at: None,
                updated_at: None,
            };
            self.rows.retain(|row| row.id != id);
            self.rows.push(saved.clone());
            Ok(saved)
        }

        fn delete_category(&mut self, id: &CategoryId) -> Result<()> {
            self.deleted.push(id.clone());
            if let Some(error) = &self.delete_error {
                return Err(anyhow!("{error}"));
            }
            self.rows.retain(|row| &row.id != id);
            Ok(())
        }

        fn form_builder(&self) -> &dyn FormBuilderPanel {
            &self.panel
        }
    }

    struct Harness {
        state: CategoryListState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(rows: Vec<Category>) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut harness = Self {
                state: CategoryListState::default(),
                runtime: TestRuntime::with_rows(rows),
                view_data: ViewData::default(),
                tx,
                rx,
            };
            harness.tick();
            harness
        }

        fn tick(&mut self) {
            process_internal_events(&mut self.state, &mut self.view_data, &self.tx, &self.rx);
            refresh_categories(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
            );
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.press_with(code, KeyModifiers::NONE)
        }

        fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
            handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            )
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn status(&self) -> String {
            self.state
                .status_line
                .as_ref()
                .map(|note| note.display())
                .unwrap_or_default()
        }
    }

    fn fixture() -> Vec<Category> {
        vec![
            category("1", "Tech", Some("Gadgets")),
            category("2", "Food", None),
        ]
    }

    #[test]
    fn first_tick_loads_categories_once() {
        let mut harness = Harness::new(fixture());
        harness.tick();
        assert_eq!(harness.runtime.load_count, 1);
        assert_eq!(harness.view_data.cache.items().len(), 2);
        assert!(!harness.view_data.cache.snapshot().is_loading);
    }

    #[test]
    fn load_failure_reports_status() {
        let (tx, rx) = mpsc::channel();
        let mut harness = Harness {
            state: CategoryListState::default(),
            runtime: TestRuntime::with_rows(Vec::new()),
            view_data: ViewData::default(),
            tx,
            rx,
        };
        harness.runtime.load_error = Some("connection refused".to_owned());
        harness.tick();
        assert!(harness.status().contains("load failed: connection refused -- retrying"));
        assert!(!harness.view_data.cache.snapshot().is_loading);
    }

    #[test]
    fn failed_load_recovers_with_refresh_key() {
        let (tx, rx) = mpsc::channel();
        let mut harness = Harness {
            state: CategoryListState::default(),
            runtime: TestRuntime::with_rows(fixture()),
            view_data: ViewData::default(),
            tx,
            rx,
        };
        harness.runtime.load_error = Some("connection refused".to_owned());
        harness.tick();
        harness.runtime.load_error = None;
        harness.tick();

        // The retry delay has not elapsed, so the second tick does not refetch.
        assert_eq!(harness.runtime.load_count, 1);
        let snapshot = harness.view_data.cache.snapshot();
        assert_eq!(
            list_placeholder(&snapshot, harness.view_data.cache.has_failed(), ""),
            Some(LOAD_FAILED_MESSAGE)
        );

        harness.press(KeyCode::Char('r'));
        assert_eq!(harness.status(), "refreshing categories");
        harness.tick();

        assert_eq!(harness.runtime.load_count, 2);
        assert_eq!(harness.view_data.cache.items().len(), 2);
        let snapshot = harness.view_data.cache.snapshot();
        assert_eq!(
            list_placeholder(&snapshot, harness.view_data.cache.has_failed(), ""),
            None
        );
    }

    #[test]
    fn exhausted_retries_keep_previous_rows() {
        let mut harness = Harness::new(fixture());
        harness.runtime.load_error = Some("timeout".to_owned());
        harness.press(KeyCode::Char('r'));

        let start = Instant::now();
        for attempt in 0..MAX_FETCH_ATTEMPTS {
            let Harness {
                runtime, view_data, ..
            } = &mut harness;
            let later = start + Duration::from_secs(60 * u64::from(attempt));
            assert!(
                view_data
                    .cache
                    .refresh_at(later, || runtime.load_categories())
                    .is_err()
            );
        }

        assert!(!harness.view_data.cache.is_stale());
        assert_eq!(harness.view_data.cache.items().len(), 2);
        let snapshot = harness.view_data.cache.snapshot();
        assert_eq!(
            list_placeholder(&snapshot, harness.view_data.cache.has_failed(), ""),
            None
        );

        harness.runtime.load_error = None;
        harness.press(KeyCode::Char('r'));
        harness.tick();
        assert!(!harness.view_data.cache.has_failed());
        assert_eq!(harness.runtime.load_count, 2 + MAX_FETCH_ATTEMPTS as usize);
    }

    #[test]
    fn placeholder_tracks_loading_and_empty_states() {
        let harness = Harness::new(fixture());
        let snapshot = harness.view_data.cache.snapshot();
        assert_eq!(list_placeholder(&snapshot, false, ""), None);
        assert_eq!(
            list_placeholder(&snapshot, false, "zz"),
            Some(EMPTY_SEARCH_MESSAGE)
        );
        // Rows from an earlier load stay visible after a failed refetch.
        assert_eq!(list_placeholder(&snapshot, true, ""), None);

        let empty = Harness::new(Vec::new());
        let snapshot = empty.view_data.cache.snapshot();
        assert_eq!(
            list_placeholder(&snapshot, false, ""),
            Some(EMPTY_LIST_MESSAGE)
        );

        let loading = ViewData::default();
        assert_eq!(
            list_placeholder(&loading.cache.snapshot(), false, ""),
            Some(LOADING_MESSAGE)
        );
    }

    #[test]
    fn search_typing_filters_rows() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('/'));
        harness.type_text("GAD");
        harness.press(KeyCode::Enter);

        assert!(!harness.view_data.search_editing);
        assert_eq!(harness.state.search_query, "GAD");
        assert_eq!(
            super::visible_rows(&harness.state, &harness.view_data).len(),
            1
        );

        harness.press(KeyCode::Char('/'));
        harness.press(KeyCode::Backspace);
        assert_eq!(harness.state.search_query, "GA");
        harness.press(KeyCode::Esc);

        harness.press(KeyCode::Esc);
        assert!(harness.state.search_query.is_empty());
    }

    #[test]
    fn confirmed_delete_notifies_and_refetches() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('d'));
        assert!(harness.view_data.confirm_delete.is_some());
        assert!(status_text(&harness.state, &harness.view_data).starts_with("CONFIRM"));

        harness.press(KeyCode::Char('y'));
        assert_eq!(harness.runtime.deleted, vec![CategoryId::new("1")]);

        harness.tick();
        let note = harness.state.status_line.clone().expect("status set");
        assert_eq!(note.variant, NotifyVariant::Default);
        assert_eq!(note.title, "Success");
        assert_eq!(harness.view_data.cache.invalidation_count(), 1);
        assert!(harness.view_data.pending_deletes.is_empty());
        assert_eq!(harness.runtime.load_count, 2);
        assert_eq!(harness.view_data.cache.items().len(), 1);
    }

    #[test]
    fn failed_delete_keeps_cache() {
        let mut harness = Harness::new(fixture());
        harness.runtime.delete_error = Some("network down".to_owned());
        harness.press(KeyCode::Char('d'));
        harness.press(KeyCode::Enter);
        harness.tick();

        let note = harness.state.status_line.clone().expect("status set");
        assert_eq!(note.variant, NotifyVariant::Destructive);
        assert_eq!(note.description, "network down");
        assert_eq!(harness.view_data.cache.invalidation_count(), 0);
        assert_eq!(harness.runtime.load_count, 1);
    }

    #[test]
    fn failed_delete_without_message_uses_fallback() {
        let mut harness = Harness::new(fixture());
        harness.runtime.delete_error = Some(String::new());
        harness.press(KeyCode::Char('d'));
        harness.press(KeyCode::Char('y'));
        harness.tick();

        let note = harness.state.status_line.clone().expect("status set");
        assert_eq!(note.description, DELETE_FALLBACK_MESSAGE);
    }

    #[test]
    fn canceled_delete_does_nothing() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('d'));
        harness.press(KeyCode::Char('x'));
        assert!(harness.view_data.confirm_delete.is_some());

        harness.press(KeyCode::Char('n'));
        assert!(harness.view_data.confirm_delete.is_none());
        assert!(harness.runtime.deleted.is_empty());
        assert_eq!(harness.status(), "delete canceled");
    }

    #[test]
    fn configure_opens_form_builder_and_esc_returns() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Char('c'));

        assert_eq!(harness.state.active_tab, ListTab::FormBuilder);
        assert_eq!(harness.state.selected_id(), Some(&CategoryId::new("2")));
        let text = form_builder_text(&harness.state, &harness.runtime.panel);
        assert!(text.contains("T Food"));
        assert!(text.contains("fields for 2"));
        assert_eq!(header_action(&harness.state).1, "Back to Categories");

        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.active_tab, ListTab::List);
        assert!(harness.state.selected_category.is_none());
        assert_eq!(header_action(&harness.state).1, "Add Category");
    }

    #[test]
    fn form_builder_returns_to_list_when_category_disappears() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Char('c'));
        assert_eq!(harness.state.active_tab, ListTab::FormBuilder);

        harness.runtime.rows.retain(|row| row.id != CategoryId::new("2"));
        harness.press(KeyCode::Char('r'));
        harness.tick();

        assert_eq!(harness.state.active_tab, ListTab::List);
        assert!(harness.state.selected_category.is_none());
        assert!(harness.status().contains("\"Food\" no longer exists"));
        assert_eq!(harness.view_data.cursor, 0);
    }

    #[test]
    fn tab_without_selection_is_rejected() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Tab);
        assert_eq!(harness.state.active_tab, ListTab::List);
        assert!(harness.status().contains(NO_SELECTION_HINT));
    }

    #[test]
    fn create_drawer_submits_and_invalidates() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('a'));
        assert!(harness.state.create_drawer_open);
        harness.type_text("Books");
        harness.press(KeyCode::Tab);
        harness.type_text("Novels");
        harness.press(KeyCode::Enter);

        assert!(harness.view_data.drawer.is_none());
        assert!(!harness.state.create_drawer_open);
        assert_eq!(harness.runtime.submitted.len(), 1);
        let (mode, input) = &harness.runtime.submitted[0];
        assert_eq!(mode, &DrawerMode::Create);
        assert_eq!(input.title, "Books");
        assert_eq!(input.description.as_deref(), Some("Novels"));
        assert_eq!(harness.view_data.cache.invalidation_count(), 1);

        harness.tick();
        assert_eq!(harness.view_data.cache.items().len(), 3);
        assert!(harness.status().contains("Category created successfully"));
    }

    #[test]
    fn invalid_drawer_stays_open() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('a'));
        harness.press_with(KeyCode::Char('s'), KeyModifiers::CONTROL);

        assert!(harness.view_data.drawer.is_some());
        assert!(harness.status().contains("title is required"));
        assert!(harness.runtime.submitted.is_empty());
        assert_eq!(harness.view_data.cache.invalidation_count(), 0);
    }

    #[test]
    fn store_failure_keeps_drawer_open() {
        let mut harness = Harness::new(fixture());
        harness.runtime.submit_error = Some("duplicate title".to_owned());
        harness.press(KeyCode::Char('a'));
        harness.type_text("Tech");
        harness.press(KeyCode::Enter);

        assert!(harness.view_data.drawer.is_some());
        assert!(harness.status().contains("save failed: duplicate title"));
    }

    #[test]
    fn edit_drawer_prefills_and_esc_clears_selection() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('e'));

        assert!(harness.state.edit_drawer_open);
        let drawer = harness.view_data.drawer.clone().expect("drawer open");
        assert_eq!(drawer.fields[0], "Tech");
        assert_eq!(drawer.fields[1], "Gadgets");
        assert!(drawer_text(&drawer).contains("> Title: Tech"));

        harness.press(KeyCode::Esc);
        assert!(!harness.state.edit_drawer_open);
        assert!(harness.state.selected_category.is_none());
    }

    #[test]
    fn edit_from_form_builder_refreshes_selection() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('c'));
        harness.press(KeyCode::Char('e'));
        harness.press(KeyCode::Backspace);
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.active_tab, ListTab::FormBuilder);
        assert!(harness.state.selected_category.is_some());
        harness.tick();
        let selected = harness.state.selected_category.clone().expect("selection kept");
        assert_eq!(selected.title, "Tec");
    }

    #[test]
    fn stale_clear_status_token_is_ignored() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('d'));
        harness.press(KeyCode::Esc);
        let token = harness.view_data.status_token;

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: token - 1 })
            .expect("send");
        harness.tick();
        assert!(harness.state.status_line.is_some());

        harness
            .tx
            .send(InternalEvent::ClearStatus { token })
            .expect("send");
        harness.tick();
        assert!(harness.state.status_line.is_none());
    }

    #[test]
    fn quit_keys() {
        let mut harness = Harness::new(fixture());
        assert!(harness.press_with(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(harness.press(KeyCode::Char('q')));

        harness.press(KeyCode::Char('/'));
        assert!(!harness.press(KeyCode::Char('q')));
        assert_eq!(harness.state.search_query, "q");
    }

    #[test]
    fn help_overlay_toggles() {
        let mut harness = Harness::new(fixture());
        harness.press(KeyCode::Char('?'));
        assert!(harness.view_data.help_visible);
        harness.press(KeyCode::Char('d'));
        assert!(harness.view_data.confirm_delete.is_none());
        harness.press(KeyCode::Esc);
        assert!(!harness.view_data.help_visible);
        assert!(help_overlay_text().contains("configure form"));
    }

    #[test]
    fn color_parsing() {
        assert_eq!(color_for("#3b82f6"), Color::Rgb(0x3b, 0x82, 0xf6));
        assert_eq!(color_for("blue"), Color::Reset);
        assert_eq!(color_for("#fff"), Color::Reset);
        assert_eq!(color_for("#zzzzzz"), Color::Reset);
    }

    #[test]
    fn text_helpers() {
        let row = category("1", "Tech", Some("Gadgets"));
        assert_eq!(title_cell_text(&row), "T Tech");
        assert_eq!(count_cell_text(&row), "");
        let counted = Category {
            count: Some(4),
            ..row.clone()
        };
        assert_eq!(count_cell_text(&counted), "4");
        let text = confirm_text(&row);
        assert!(text.starts_with("Are you absolutely sure?"));
        assert!(text.contains("cannot be undone"));

        let state = CategoryListState::default();
        assert_eq!(form_builder_text(&state, &StaticPanel), NO_SELECTION_HINT);
    }
}
