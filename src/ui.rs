use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use sales_registry::{
    ChangeListener, CloseRequest, Department, EntityForm, FormBinding, FormError, ParsePolicy,
    PersistenceService, SaveOutcome, Seller, SqliteStore,
};
use std::cell::Cell as Flag;
use std::io;
use std::rc::Rc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Departments,
    Sellers,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Departments => Page::Sellers,
            Page::Sellers => Page::Departments,
        }
    }

    pub fn previous(&self) -> Self {
        // Two pages: previous and next coincide
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Departments => "Departments",
            Page::Sellers => "Sellers",
        }
    }
}

/// List screens subscribe this to every form they open
pub struct RefreshOnChange {
    stale: Rc<Flag<bool>>,
}

impl ChangeListener for RefreshOnChange {
    fn on_changed(&self) {
        self.stale.set(true);
    }
}

// ============================================================================
// FORM SCREEN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSignal {
    Stay,
    Saved,
    Cancelled,
}

/// A form plus which field has the cursor
pub struct FormScreen<E: FormBinding> {
    pub form: EntityForm<E>,
    pub focus: usize,
}

impl<E: FormBinding> FormScreen<E> {
    pub fn new(form: EntityForm<E>) -> Self {
        let focus = form
            .fields()
            .editable_indices()
            .first()
            .copied()
            .unwrap_or(0);
        FormScreen { form, focus }
    }

    fn focus_next(&mut self) {
        let editable = self.form.fields().editable_indices();
        if let Some(next) = editable.iter().find(|&&i| i > self.focus) {
            self.focus = *next;
        } else if let Some(first) = editable.first() {
            self.focus = *first;
        }
    }

    fn focus_previous(&mut self) {
        let editable = self.form.fields().editable_indices();
        if let Some(prev) = editable.iter().rev().find(|&&i| i < self.focus) {
            self.focus = *prev;
        } else if let Some(last) = editable.last() {
            self.focus = *last;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<FormSignal, FormError> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                let CloseRequest = self.form.on_cancel();
                return Ok(FormSignal::Cancelled);
            }
            KeyCode::Enter => return self.save(),
            KeyCode::Char('s') if ctrl => return self.save(),
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_previous(),
            KeyCode::Backspace => {
                if let Some(field) = self.form.fields_mut().get_mut(self.focus) {
                    field.backspace();
                }
            }
            KeyCode::Char(c) if !ctrl => {
                if let Some(field) = self.form.fields_mut().get_mut(self.focus) {
                    field.push_char(c);
                }
            }
            _ => {}
        }

        Ok(FormSignal::Stay)
    }

    fn save(&mut self) -> Result<FormSignal, FormError> {
        match self.form.on_save()? {
            SaveOutcome::Saved => Ok(FormSignal::Saved),
            SaveOutcome::Invalid(_) | SaveOutcome::Failed(_) => Ok(FormSignal::Stay),
        }
    }
}

pub enum ActiveForm {
    Department(FormScreen<Department>),
    Seller(FormScreen<Seller>),
}

// ============================================================================
// APP
// ============================================================================

pub struct App {
    store: Rc<SqliteStore>,
    policy: ParsePolicy,
    pub departments: Vec<Department>,
    pub sellers: Vec<Seller>,
    pub current_page: Page,
    pub department_state: TableState,
    pub seller_state: TableState,
    pub active_form: Option<ActiveForm>,
    pub status: Option<String>,
    stale: Rc<Flag<bool>>,
    listener: Rc<RefreshOnChange>,
}

impl App {
    pub fn new(store: Rc<SqliteStore>, policy: ParsePolicy) -> Result<Self> {
        let stale = Rc::new(Flag::new(false));
        let listener = Rc::new(RefreshOnChange {
            stale: stale.clone(),
        });

        let mut app = Self {
            store,
            policy,
            departments: Vec::new(),
            sellers: Vec::new(),
            current_page: Page::Departments,
            department_state: TableState::default(),
            seller_state: TableState::default(),
            active_form: None,
            status: None,
            stale,
            listener,
        };
        app.reload()?;
        Ok(app)
    }

    pub fn reload(&mut self) -> Result<()> {
        self.departments = PersistenceService::<Department>::find_all(self.store.as_ref())?;
        self.sellers = PersistenceService::<Seller>::find_all(self.store.as_ref())?;

        clamp_selection(&mut self.department_state, self.departments.len());
        clamp_selection(&mut self.seller_state, self.sellers.len());

        self.stale.set(false);
        Ok(())
    }

    /// Reloads the lists if a form reported a change since the last load
    pub fn refresh_if_stale(&mut self) -> Result<bool> {
        if !self.stale.get() {
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    pub fn selected_department(&self) -> Option<&Department> {
        self.department_state
            .selected()
            .and_then(|i| self.departments.get(i))
    }

    pub fn selected_seller(&self) -> Option<&Seller> {
        self.seller_state.selected().and_then(|i| self.sellers.get(i))
    }

    fn current_len(&self) -> usize {
        match self.current_page {
            Page::Departments => self.departments.len(),
            Page::Sellers => self.sellers.len(),
        }
    }

    fn current_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::Departments => &mut self.department_state,
            Page::Sellers => &mut self.seller_state,
        }
    }

    pub fn next(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    fn build_form<E: FormBinding>(
        &self,
        entity: E,
        service: Rc<dyn PersistenceService<E>>,
    ) -> Result<FormScreen<E>> {
        let mut form = EntityForm::with_policy(self.policy);
        form.set_entity(entity);
        form.set_service(service);
        form.subscribe(self.listener.clone());
        form.populate()?;
        Ok(FormScreen::new(form))
    }

    pub fn open_new_form(&mut self) -> Result<()> {
        let active = match self.current_page {
            Page::Departments => {
                ActiveForm::Department(self.build_form(Department::default(), self.store.clone())?)
            }
            Page::Sellers => {
                ActiveForm::Seller(self.build_form(Seller::default(), self.store.clone())?)
            }
        };
        self.active_form = Some(active);
        Ok(())
    }

    pub fn open_edit_form(&mut self) -> Result<()> {
        let active = match self.current_page {
            Page::Departments => match self.selected_department().cloned() {
                Some(dept) => ActiveForm::Department(self.build_form(dept, self.store.clone())?),
                None => return Ok(()),
            },
            Page::Sellers => match self.selected_seller().cloned() {
                Some(seller) => ActiveForm::Seller(self.build_form(seller, self.store.clone())?),
                None => return Ok(()),
            },
        };
        self.active_form = Some(active);
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<()> {
        let result = match self.current_page {
            Page::Departments => match self.selected_department().and_then(|d| d.id) {
                Some(id) => PersistenceService::<Department>::delete_by_id(self.store.as_ref(), id),
                None => return Ok(()),
            },
            Page::Sellers => match self.selected_seller().and_then(|s| s.id) {
                Some(id) => PersistenceService::<Seller>::delete_by_id(self.store.as_ref(), id),
                None => return Ok(()),
            },
        };

        match result {
            Ok(()) => {
                info!(page = self.current_page.title(), "record deleted");
                self.status = Some("Record deleted".to_string());
                self.reload()?;
            }
            Err(err) => {
                warn!(error = %err, "error removing object");
                self.status = Some(format!("Error removing object: {}", err));
            }
        }
        Ok(())
    }

    /// Routes a key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if let Some(active) = self.active_form.as_mut() {
            let signal = match active {
                ActiveForm::Department(screen) => screen.handle_key(key)?,
                ActiveForm::Seller(screen) => screen.handle_key(key)?,
            };
            match signal {
                FormSignal::Stay => {}
                FormSignal::Saved => {
                    self.active_form = None;
                    self.status = Some("Saved".to_string());
                    self.refresh_if_stale()?;
                }
                FormSignal::Cancelled => {
                    self.active_form = None;
                    self.status = None;
                }
            }
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab => self.current_page = self.current_page.next(),
            KeyCode::BackTab => self.current_page = self.current_page.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Char('n') => self.open_new_form()?,
            KeyCode::Enter | KeyCode::Char('e') => self.open_edit_form()?,
            KeyCode::Char('d') => self.delete_selected()?,
            KeyCode::Char('r') => self.reload()?,
            _ => {}
        }
        Ok(false)
    }
}

fn clamp_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        let i = state.selected().unwrap_or(0).min(len - 1);
        state.select(Some(i));
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key)? {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // List
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Departments => render_departments(f, chunks[1], app),
        Page::Sellers => render_sellers(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    if let Some(active) = &app.active_form {
        let area = centered_rect(60, 70, f.size());
        f.render_widget(Clear, area);
        match active {
            ActiveForm::Department(screen) => render_form(f, area, screen),
            ActiveForm::Seller(screen) => render_form(f, area, screen),
        }
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Departments, Page::Sellers];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Departments: {}  Sellers: {}", app.departments.len(), app.sellers.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(Line::from(tab_spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn list_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn render_departments(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.departments.iter().map(|dept| {
        Row::new(vec![
            Cell::from(format_id(dept.id)),
            Cell::from(dept.name.clone()),
        ])
    });

    let table = Table::new(rows, [Constraint::Length(8), Constraint::Min(20)])
        .header(header_row(&["Id", "Name"]))
        .block(list_block(" Departments "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.department_state);
}

fn render_sellers(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.sellers.iter().map(|seller| {
        Row::new(vec![
            Cell::from(format_id(seller.id)),
            Cell::from(truncate(&seller.name, 30)),
            Cell::from(truncate(&seller.email, 30)),
            Cell::from(
                seller
                    .birth_date
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_default(),
            ),
            Cell::from(
                seller
                    .base_salary
                    .map(|s| format!("{:.2}", s))
                    .unwrap_or_default(),
            )
            .style(Style::default().fg(Color::Green)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(32),
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["Id", "Name", "Email", "Birth date", "Base salary"]))
    .block(list_block(" Sellers "))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.seller_state);
}

fn render_form<E: FormBinding>(f: &mut Frame, area: Rect, screen: &FormScreen<E>) {
    let form = &screen.form;
    let label_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![Line::from("")];
    for (i, field) in form.fields().iter().enumerate() {
        let focused = i == screen.focus;
        let value_style = if !field.is_editable() {
            Style::default().fg(Color::DarkGray)
        } else if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if focused { "_" } else { "" };

        content.push(Line::from(vec![
            Span::styled(format!("  {:<12} ", field.label()), label_style),
            Span::styled(format!("{}{}", field.text(), cursor), value_style),
        ]));

        if let Some(message) = form.errors().get(field.name()) {
            content.push(Line::from(Span::styled(
                format!("  {:<12} {}", "", message),
                Style::default().fg(Color::Red),
            )));
        }
        content.push(Line::from(""));
    }

    if let Some(alert) = form.alert() {
        content.push(Line::from(Span::styled(
            format!("  Error saving object: {}", alert),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        content.push(Line::from(""));
    }

    content.push(Line::from(Span::styled(
        "  Enter: save  Esc: cancel  Tab: next field",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let verb = if form.is_new_record() { "New" } else { "Edit" };
    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} {} ", verb, E::KIND)),
    );

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let help = if app.active_form.is_some() {
        "Enter save │ Esc cancel │ Tab/↑↓ move"
    } else {
        "q quit │ Tab page │ ↑↓ select │ n new │ e edit │ d delete │ r reload"
    };

    let mut spans = vec![Span::styled(help, Style::default().fg(Color::DarkGray))];
    if let Some(status) = &app.status {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }

    let bar = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(bar, area);
}

fn format_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
