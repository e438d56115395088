use anyhow::Result;
use creature_viewer::{
    Creature, DerivedCreature, LoadError, LoadState, Message, Snapshot, ViewState,
};
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
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

const PAGE_SIZE: usize = 20;
const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Threshold,
}

impl Focus {
    pub fn toggle(&self) -> Self {
        match self {
            Focus::Search => Focus::Threshold,
            Focus::Threshold => Focus::Search,
        }
    }
}

pub struct App {
    pub view: ViewState,
    pub state: TableState,
    pub focus: Focus,
    pub source_label: String,
    loader: Option<Receiver<Result<Vec<Creature>, LoadError>>>,
    pub should_quit: bool,
}

impl App {
    pub fn new(source_label: String, loader: Receiver<Result<Vec<Creature>, LoadError>>) -> Self {
        Self {
            view: ViewState::new(),
            state: TableState::default(),
            focus: Focus::Search,
            source_label,
            loader: Some(loader),
            should_quit: false,
        }
    }

    /// Pick up the background load result if it has arrived
    pub fn poll_load(&mut self) {
        let Some(rx) = &self.loader else {
            return;
        };

        let message = match rx.try_recv() {
            Ok(result) => Message::Loaded(result),
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Message::Loaded(Err(LoadError::Interrupted)),
        };

        self.loader = None;
        self.dispatch(message);
    }

    pub fn dispatch(&mut self, message: Message) {
        self.view.update(message);
        self.clamp_selection();
    }

    fn row_count(&self) -> usize {
        self.view.snapshot().rows.len()
    }

    /// Keep the selection inside the filtered rows
    fn clamp_selection(&mut self) {
        let len = self.row_count();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            Some(_) => {}
        }
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        let mut text = match self.focus {
            Focus::Search => self.view.search_input().to_string(),
            Focus::Threshold => self.view.threshold_input().to_string(),
        };
        edit(&mut text);

        let message = match self.focus {
            Focus::Search => Message::SearchChanged(text),
            Focus::Threshold => Message::ThresholdChanged(text),
        };
        self.dispatch(message);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Tab | KeyCode::BackTab => self.focus = self.focus.toggle(),
            KeyCode::Char(ch)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.edit_focused(|text| text.push(ch))
            }
            KeyCode::Backspace => self.edit_focused(|text| {
                text.pop();
            }),
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => self.clamp_home(),
            KeyCode::End => {
                let len = self.row_count();
                if len > 0 {
                    self.state.select(Some(len - 1));
                }
            }
            _ => {}
        }
    }

    fn clamp_home(&mut self) {
        if self.row_count() > 0 {
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + PAGE_SIZE).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(PAGE_SIZE));
        self.state.select(Some(i));
    }
}

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

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.poll_load();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search, threshold, count
            Constraint::Min(0),    // Table + min/max panel
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(18)])
        .split(chunks[1]);

    let snapshot = app.view.snapshot();

    render_top_bar(f, chunks[0], app.focus, &app.view, &snapshot);
    render_table(f, content_chunks[0], &app.view, &snapshot, &mut app.state);
    render_side_panel(f, content_chunks[1], &snapshot);
    render_status_bar(f, chunks[2], &app.source_label, &app.view, &snapshot, &app.state);
}

fn input_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn render_top_bar(f: &mut Frame, area: Rect, focus: Focus, view: &ViewState, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(20),
            Constraint::Min(0),
        ])
        .split(area);

    let search = Paragraph::new(view.search_input())
        .block(input_block(" Search ", focus == Focus::Search));
    f.render_widget(search, chunks[0]);

    let threshold = Paragraph::new(view.threshold_input())
        .block(input_block(" Power threshold ", focus == Focus::Threshold));
    f.render_widget(threshold, chunks[1]);

    let count = Paragraph::new(Line::from(vec![
        Span::raw("Count over threshold: "),
        Span::styled(
            snapshot.summary.count_above.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(count, chunks[2]);

    // Cursor at the end of the focused input
    let (input_area, text) = match focus {
        Focus::Search => (chunks[0], view.search_input()),
        Focus::Threshold => (chunks[1], view.threshold_input()),
    };
    let max_x = input_area.x + input_area.width.saturating_sub(2);
    let x = (input_area.x + 1 + text.chars().count() as u16).min(max_x);
    f.set_cursor(x, input_area.y + 1);
}

fn creature_row(d: &DerivedCreature) -> Row<'static> {
    let c = &d.creature;
    let mut cells = vec![
        Cell::from(c.id.to_string()),
        Cell::from(truncate(&c.name, 20)),
        Cell::from(truncate(&c.type_label(), 18)),
    ];
    cells.extend(c.stats().iter().map(|s| Cell::from(s.to_string())));
    cells.push(
        Cell::from(d.power.to_string())
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    );

    Row::new(cells).height(1)
}

fn render_table(
    f: &mut Frame,
    area: Rect,
    view: &ViewState,
    snapshot: &Snapshot,
    state: &mut TableState,
) {
    let header_cells = ["ID", "Name", "Type", "HP", "Atk", "Def", "SpA", "SpD", "Spe", "Power"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = snapshot.rows.iter().map(|d| creature_row(d));

    let (title, border) = match view.load_state() {
        LoadState::Loading => (" Creatures (loading...) ".to_string(), Color::White),
        LoadState::Loaded => (format!(" Creatures ({}) ", snapshot.rows.len()), Color::White),
        LoadState::Failed(_) => (" Creatures (load failed) ".to_string(), Color::Red),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(22),
            Constraint::Length(20),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, state);
}

fn render_side_panel(f: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Min: ", label),
            Span::raw(snapshot.summary.display_min().to_string()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Max: ", label),
            Span::raw(snapshot.summary.display_max().to_string()),
        ]),
    ];

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Power "),
    );

    f.render_widget(panel, area);
}

fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    source_label: &str,
    view: &ViewState,
    snapshot: &Snapshot,
    state: &TableState,
) {
    let selected = state.selected().map(|i| i + 1).unwrap_or(0);
    let total = snapshot.rows.len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    status_spans.push(Span::raw(" | "));
    match view.load_state() {
        LoadState::Loading => status_spans.push(Span::styled(
            format!("Loading {}...", source_label),
            Style::default().fg(Color::Yellow),
        )),
        LoadState::Loaded => status_spans.push(Span::styled(
            source_label.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        LoadState::Failed(err) => status_spans.push(Span::styled(
            format!("Error: {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
    }

    if view.literal_search() {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled("literal match", Style::default().fg(Color::Magenta)));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Field | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Fast | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
