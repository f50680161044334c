use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use mediamap::backend::{dispatch_pending, MediaBackend, SnapshotBackend, TagDef, WriteQueue};
use mediamap::criteria::{SortKey, Workspace};
use mediamap::drilldown::{TileTarget, TreemapMode, TreemapTile};
use mediamap::paths;
use mediamap::record::MediaRecord;
use mediamap::scanner::{self, ScanProgress, ScanStats};
use mediamap::state::{reduce, Action, AppState, Debouncer, LayoutMode};
use mediamap::store::MediaStore;
use mediamap::treemap::Rect;
use mediamap::view::{project, ViewBody, ViewModel};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect as UiRect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use ratatui::{Frame, Terminal};
use std::io::{self, stdout};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SEARCH_QUIET: Duration = Duration::from_millis(250);
const RESIZE_QUIET: Duration = Duration::from_millis(150);

enum ScanEvent {
    Progress(ScanProgress),
    Completed(Result<(Vec<MediaRecord>, ScanStats), String>),
}

/// What a click at some cell should do.
#[derive(Clone)]
enum HitTarget {
    Tile(TileTarget),
    FolderRow(String),
}

#[derive(Clone)]
struct HitRegion {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
    target: HitTarget,
}

impl HitRegion {
    fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum InputMode {
    None,
    Path,
    Search,
}

struct App {
    scan_root: String,
    input_mode: InputMode,
    search_text: String,
    search_debounce: Debouncer<String>,
    resize_debounce: Debouncer<(f32, f32)>,
    last_area_submitted: Option<(f32, f32)>,
    status: String,
    is_scanning: bool,
    scan_progress: Option<ScanProgress>,
    scan_rx: Option<Receiver<ScanEvent>>,

    store: MediaStore,
    state: AppState,
    queue: WriteQueue,
    writes_backend: SnapshotBackend,
    /// Display metadata for known tags, from the backend.
    tag_defs: Vec<TagDef>,

    selected_path: Option<String>,
    hit_regions: Vec<HitRegion>,
    path_input_area: Option<UiRect>,
    should_quit: bool,
}

impl App {
    fn new(scan_root: String) -> Self {
        let writes_backend = SnapshotBackend::new(Path::new(&scan_root).join(".mediamap"));
        Self {
            scan_root,
            input_mode: InputMode::None,
            search_text: String::new(),
            search_debounce: Debouncer::new(SEARCH_QUIET),
            resize_debounce: Debouncer::new(RESIZE_QUIET),
            last_area_submitted: None,
            status: String::from("Press Enter to load the library, / to search"),
            is_scanning: false,
            scan_progress: None,
            scan_rx: None,
            store: MediaStore::new(),
            state: AppState::new(Rect::new(0.0, 0.0, 80.0, 24.0)),
            queue: WriteQueue::default(),
            writes_backend,
            tag_defs: Vec::new(),
            selected_path: None,
            hit_regions: Vec::new(),
            path_input_area: None,
            should_quit: false,
        }
    }

    fn dispatch(&mut self, action: Action) {
        self.state = reduce(
            &self.state,
            action,
            self.store.records(),
            scanner::now_epoch_secs(),
        );
    }

    /// Load from a snapshot directory when one is present, otherwise walk
    /// the directory in a worker thread.
    fn load_library(&mut self) {
        if self.is_scanning {
            return;
        }
        let root = if self.scan_root.trim().is_empty() {
            ".".to_string()
        } else {
            self.scan_root.trim().to_string()
        };
        self.scan_root = root.clone();
        self.writes_backend = SnapshotBackend::new(Path::new(&root).join(".mediamap"));

        let snapshot = Path::new(&root);
        if snapshot.join(SnapshotBackend::RECORDS_FILE).exists() {
            let backend = SnapshotBackend::new(snapshot);
            let records = mediamap::backend::hydrate_records(&backend);
            self.store.replace_all(records);
            if let Ok(user_data) = backend.fetch_user_data() {
                self.store.apply_user_data(&user_data);
                self.state.criteria.safe_mode.configure(
                    user_data.sensitive_tags.clone(),
                    user_data.sensitive_dirs.clone(),
                );
            }
            self.tag_defs = backend.fetch_tags().unwrap_or_default();
            self.dispatch(Action::Refresh);
            self.status = format!("Loaded snapshot: {} records", self.store.len());
            return;
        }

        if !snapshot.exists() {
            self.status = format!("Path does not exist: {}", root);
            return;
        }

        self.is_scanning = true;
        self.scan_progress = None;
        self.status = format!("Scanning {} ...", root);

        let (tx, rx) = mpsc::channel::<ScanEvent>();
        self.scan_rx = Some(rx);

        thread::spawn(move || {
            let progress_tx = tx.clone();
            let reporter: scanner::ProgressReporter = Arc::new(move |progress: ScanProgress| {
                let _ = progress_tx.send(ScanEvent::Progress(progress));
            });

            let result = scanner::scan_directory(Path::new(&root), Some(reporter))
                .map_err(|err| err.to_string());
            let _ = tx.send(ScanEvent::Completed(result));
        });
    }

    fn poll_scan_updates(&mut self) {
        let mut done: Option<Result<(Vec<MediaRecord>, ScanStats), String>> = None;
        let mut disconnected = false;

        if let Some(rx) = self.scan_rx.as_ref() {
            loop {
                match rx.try_recv() {
                    Ok(ScanEvent::Progress(progress)) => self.scan_progress = Some(progress),
                    Ok(ScanEvent::Completed(result)) => done = Some(result),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        if disconnected && done.is_none() {
            self.scan_rx = None;
            self.is_scanning = false;
            self.status = String::from("Scan worker disappeared");
        }

        if let Some(result) = done {
            self.scan_rx = None;
            self.is_scanning = false;
            self.scan_progress = None;
            match result {
                Ok((records, stats)) => {
                    self.status = format!(
                        "Indexed {} media files ({}) in {}ms",
                        stats.records,
                        format_mb(stats.total_size_mb),
                        stats.duration_ms,
                    );
                    self.store.replace_all(records);
                    self.selected_path = None;
                    self.dispatch(Action::ResetDrill);
                }
                Err(err) => self.status = format!("Scan failed: {}", err),
            }
        }
    }

    /// Debounced inputs fire between events.
    fn poll_debouncers(&mut self) {
        let now = Instant::now();
        if let Some(text) = self.search_debounce.poll(now) {
            let search = if text.is_empty() { None } else { Some(text) };
            self.dispatch(Action::SetSearch(search));
        }
        if let Some((width, height)) = self.resize_debounce.poll(now) {
            self.dispatch(Action::ResizeTreemap { width, height });
        }
    }

    /// Keep the treemap bounds in step with the body area, debounced so a
    /// drag-resize does not relayout on every intermediate size.
    fn note_body_area(&mut self, area: UiRect) {
        let dims = (area.width as f32, area.height as f32);
        let bounds = self.state.treemap.bounds();
        if (bounds.width, bounds.height) != dims && self.last_area_submitted != Some(dims) {
            self.resize_debounce.submit(dims, Instant::now());
            self.last_area_submitted = Some(dims);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Path => {
                match key.code {
                    KeyCode::Enter => {
                        self.input_mode = InputMode::None;
                        self.load_library();
                    }
                    KeyCode::Esc => self.input_mode = InputMode::None,
                    KeyCode::Backspace => {
                        self.scan_root.pop();
                    }
                    KeyCode::Char(ch) => self.scan_root.push(ch),
                    _ => {}
                }
                return;
            }
            InputMode::Search => {
                match key.code {
                    KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::None,
                    KeyCode::Backspace => {
                        self.search_text.pop();
                        self.search_debounce
                            .submit(self.search_text.clone(), Instant::now());
                    }
                    KeyCode::Char(ch) => {
                        self.search_text.push(ch);
                        self.search_debounce
                            .submit(self.search_text.clone(), Instant::now());
                    }
                    _ => {}
                }
                return;
            }
            InputMode::None => {}
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('e') => self.input_mode = InputMode::Path,
            KeyCode::Enter | KeyCode::Char('s') => self.load_library(),
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('t') => {
                let layout = match self.state.layout {
                    LayoutMode::Grid => LayoutMode::Treemap,
                    LayoutMode::Treemap => LayoutMode::Grid,
                };
                self.dispatch(Action::SetLayout(layout));
            }
            KeyCode::Char('g') => {
                let use_log = !self.state.treemap.use_log;
                self.dispatch(Action::SetTreemapScale { use_log });
            }
            KeyCode::Char('w') => {
                let next = next_workspace(self.state.criteria.workspace);
                self.dispatch(Action::SetWorkspace(next));
            }
            KeyCode::Char('1') => self.dispatch(Action::SetSortKey(SortKey::Size)),
            KeyCode::Char('2') => self.dispatch(Action::SetSortKey(SortKey::Bitrate)),
            KeyCode::Char('3') => self.dispatch(Action::SetSortKey(SortKey::Name)),
            KeyCode::Char('4') => self.dispatch(Action::SetSortKey(SortKey::Date)),
            KeyCode::Char('u') | KeyCode::Backspace => self.navigate_up(),
            KeyCode::Char('r') => {
                self.dispatch(Action::BrowseTo(None));
                self.dispatch(Action::ResetDrill);
            }
            KeyCode::Char('c') => self.dispatch(Action::ClearFilters),
            KeyCode::Char('f') => self.toggle_selected(Toggle::Favorite),
            KeyCode::Char('v') => self.toggle_selected(Toggle::Vault),
            KeyCode::Esc => self.selected_path = None,
            _ => {}
        }
    }

    fn navigate_up(&mut self) {
        match self.state.layout {
            LayoutMode::Treemap => {
                if self.state.treemap.mode() == TreemapMode::FilesInFolder {
                    self.dispatch(Action::DrillOut);
                }
            }
            LayoutMode::Grid => {
                if let Some(folder) = self.state.browse_folder.clone() {
                    let parent = paths::parent_dir(&folder).to_string();
                    let target = if parent.is_empty() { None } else { Some(parent) };
                    self.dispatch(Action::BrowseTo(target));
                }
            }
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(area) = self.path_input_area {
                    if point_in_rect(area, mouse.column, mouse.row) {
                        self.input_mode = InputMode::Path;
                        return;
                    }
                }
                let hit = self
                    .hit_regions
                    .iter()
                    .find(|region| region.contains(mouse.column, mouse.row))
                    .cloned();
                if let Some(region) = hit {
                    self.activate(region.target);
                }
            }
            MouseEventKind::Down(MouseButton::Middle) => self.navigate_up(),
            _ => {}
        }
    }

    fn activate(&mut self, target: HitTarget) {
        match target {
            HitTarget::Tile(TileTarget::Folder(path)) => {
                self.selected_path = None;
                self.dispatch(Action::DrillInto(path));
            }
            HitTarget::Tile(TileTarget::Record(path)) => {
                self.status = format!("Selected {}", path);
                self.selected_path = Some(path);
            }
            HitTarget::FolderRow(path) => {
                self.selected_path = None;
                self.dispatch(Action::BrowseTo(Some(path)));
            }
        }
    }

    fn toggle_selected(&mut self, toggle: Toggle) {
        let Some(path) = self.selected_path.clone() else {
            self.status = String::from("Nothing selected");
            return;
        };
        let changed = match toggle {
            Toggle::Favorite => self.store.toggle_favorite(&path, &mut self.queue),
            Toggle::Vault => self.store.toggle_hidden(&path, &mut self.queue),
        };
        if !changed {
            self.status = format!("{} is gone from the library", path);
            return;
        }
        // Optimistic: the pipeline re-runs now, the save happens behind it.
        self.dispatch(Action::Refresh);
        let notices = dispatch_pending(&mut self.queue, &self.writes_backend);
        self.status = match notices.first() {
            Some(notice) => notice.message.clone(),
            None => format!("Updated {}", path),
        };
    }
}

#[derive(Clone, Copy)]
enum Toggle {
    Favorite,
    Vault,
}

fn next_workspace(workspace: Workspace) -> Workspace {
    match workspace {
        Workspace::Lobby => Workspace::Vault,
        Workspace::Vault => Workspace::Favorites,
        Workspace::Favorites => Workspace::Review,
        Workspace::Review => Workspace::Duplicates,
        Workspace::Duplicates => Workspace::Lobby,
    }
}

fn workspace_label(workspace: Workspace) -> &'static str {
    match workspace {
        Workspace::Lobby => "lobby",
        Workspace::Vault => "vault",
        Workspace::Favorites => "favorites",
        Workspace::Review => "review",
        Workspace::Duplicates => "duplicates",
    }
}

fn sort_label(key: SortKey) -> &'static str {
    match key {
        SortKey::Size => "size",
        SortKey::Bitrate => "bitrate",
        SortKey::Name => "name",
        SortKey::Date => "date",
    }
}

fn format_mb(size_mb: f64) -> String {
    if size_mb < 0.0 {
        return format!("-{}", format_mb(-size_mb));
    }
    if size_mb >= 1024.0 {
        format!("{:.2} GB", size_mb / 1024.0)
    } else if size_mb >= 1.0 {
        format!("{:.1} MB", size_mb)
    } else {
        format!("{:.0} KB", size_mb * 1024.0)
    }
}

fn point_in_rect(rect: UiRect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

fn tile_bounds_in_area(rect: Rect, area: UiRect) -> Option<(u16, u16, u16, u16)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    let max_x = area.x.saturating_add(area.width.saturating_sub(1));
    let max_y = area.y.saturating_add(area.height.saturating_sub(1));

    let mut x0 = area.x.saturating_add(rect.x.floor().max(0.0) as u16);
    let mut y0 = area.y.saturating_add(rect.y.floor().max(0.0) as u16);
    let mut x1 = area
        .x
        .saturating_add(((rect.x + rect.width).ceil().max(1.0) as u16).saturating_sub(1));
    let mut y1 = area
        .y
        .saturating_add(((rect.y + rect.height).ceil().max(1.0) as u16).saturating_sub(1));

    x0 = x0.clamp(area.x, max_x);
    y0 = y0.clamp(area.y, max_y);
    x1 = x1.clamp(area.x, max_x);
    y1 = y1.clamp(area.y, max_y);

    if x1 < x0 || y1 < y0 {
        return None;
    }
    Some((x0, y0, x1, y1))
}

/// Folder tiles shade toward amber as their HIGH-bitrate share grows; file
/// tiles stay in the teal range, scaled by weight.
fn tile_color(tile: &TreemapTile, max_weight: f32) -> Color {
    let ratio = if max_weight <= 0.0 {
        0.0
    } else {
        (tile.weight / max_weight).clamp(0.0, 1.0)
    };
    match tile.status_ratio {
        Some(high_share) => {
            let r = (45.0 + high_share * 170.0) as u8;
            let g = (105.0 + ratio * 70.0) as u8;
            let b = (150.0 - high_share * 80.0) as u8;
            Color::Rgb(r, g, b)
        }
        None => {
            let r = (40.0 + ratio * 60.0) as u8;
            let g = (110.0 + ratio * 80.0) as u8;
            let b = (110.0 + ratio * 60.0) as u8;
            Color::Rgb(r, g, b)
        }
    }
}

struct TreemapWidget<'a> {
    tiles: &'a [TreemapTile],
    selected_path: Option<&'a str>,
    hit_regions: &'a mut Vec<HitRegion>,
}

impl Widget for TreemapWidget<'_> {
    fn render(self, area: UiRect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for y in area.y..area.y.saturating_add(area.height) {
            for x in area.x..area.x.saturating_add(area.width) {
                buf[(x, y)]
                    .set_char(' ')
                    .set_style(Style::default().bg(Color::Rgb(18, 18, 20)));
            }
        }

        let max_weight = self
            .tiles
            .iter()
            .map(|tile| tile.weight)
            .fold(0.0_f32, f32::max);

        for tile in self.tiles {
            let Some((x0, y0, x1, y1)) = tile_bounds_in_area(tile.rect, area) else {
                continue;
            };
            self.hit_regions.push(HitRegion {
                x0,
                y0,
                x1,
                y1,
                target: HitTarget::Tile(tile.target.clone()),
            });

            let tile_path = match &tile.target {
                TileTarget::Folder(path) | TileTarget::Record(path) => path.as_str(),
            };
            let is_selected = self.selected_path == Some(tile_path);

            let bg = tile_color(tile, max_weight);
            let border = if is_selected {
                Color::Rgb(246, 211, 101)
            } else {
                Color::Rgb(210, 210, 214)
            };

            for y in y0..=y1 {
                for x in x0..=x1 {
                    buf[(x, y)]
                        .set_char(' ')
                        .set_style(Style::default().bg(bg).fg(Color::White));
                }
            }
            for x in x0..=x1 {
                buf[(x, y0)]
                    .set_char('─')
                    .set_style(Style::default().fg(border).bg(bg));
                buf[(x, y1)]
                    .set_char('─')
                    .set_style(Style::default().fg(border).bg(bg));
            }
            for y in y0..=y1 {
                buf[(x0, y)]
                    .set_char('│')
                    .set_style(Style::default().fg(border).bg(bg));
                buf[(x1, y)]
                    .set_char('│')
                    .set_style(Style::default().fg(border).bg(bg));
            }
            buf[(x0, y0)].set_char('┌').set_style(Style::default().fg(border).bg(bg));
            buf[(x1, y0)].set_char('┐').set_style(Style::default().fg(border).bg(bg));
            buf[(x0, y1)].set_char('└').set_style(Style::default().fg(border).bg(bg));
            buf[(x1, y1)].set_char('┘').set_style(Style::default().fg(border).bg(bg));

            // The projection already decided whether the block can hold text.
            if let Some(label) = &tile.label {
                let label_width = x1.saturating_sub(x0).saturating_sub(1) as usize;
                if label_width >= 4 {
                    let mut text = format!("{} {}", label, format_mb(tile.size_mb));
                    if text.len() > label_width {
                        text.truncate(label_width.saturating_sub(1));
                        text.push('…');
                    }
                    for (i, ch) in text.chars().enumerate() {
                        let x = x0.saturating_add(1).saturating_add(i as u16);
                        if x > x1.saturating_sub(1) {
                            break;
                        }
                        buf[(x, y0)].set_char(ch).set_style(
                            Style::default()
                                .fg(Color::White)
                                .bg(bg)
                                .add_modifier(Modifier::BOLD),
                        );
                    }
                }
            }
        }
    }
}

fn grid_lines<'a>(
    model: &'a ViewModel,
    selected: Option<&str>,
    inner: UiRect,
    hit_regions: &mut Vec<HitRegion>,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let ViewBody::Grid { folders, files } = &model.body else {
        return lines;
    };

    for folder in folders {
        let y = inner.y.saturating_add(lines.len() as u16);
        if y < inner.y.saturating_add(inner.height) {
            hit_regions.push(HitRegion {
                x0: inner.x,
                y0: y,
                x1: inner.x.saturating_add(inner.width.saturating_sub(1)),
                y1: y,
                target: HitTarget::FolderRow(folder.path.clone()),
            });
        }
        let marker = if folder.has_subfolders { "▸" } else { "·" };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {:<28}", marker, folder.name),
                Style::default().fg(Color::Rgb(120, 180, 240)),
            ),
            Span::raw(format!("{:>5} items  ", folder.count)),
            Span::raw(format_mb(folder.size_mb)),
        ]));
    }

    for file in files {
        let y = inner.y.saturating_add(lines.len() as u16);
        if y < inner.y.saturating_add(inner.height) {
            hit_regions.push(HitRegion {
                x0: inner.x,
                y0: y,
                x1: inner.x.saturating_add(inner.width.saturating_sub(1)),
                y1: y,
                target: HitTarget::Tile(TileTarget::Record(file.path.clone())),
            });
        }
        let mut spans = vec![Span::raw(if file.favorite { "★ " } else { "  " })];
        let style = if selected == Some(file.path.as_str()) {
            Style::default().fg(Color::Rgb(246, 211, 101))
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("{:<34}", file.name), style));
        spans.push(Span::raw(format!("{:>10}  ", format_mb(file.size_mb))));
        if !file.tags.is_empty() {
            spans.push(Span::styled(
                file.tags.join(","),
                Style::default().fg(Color::Rgb(140, 140, 150)),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines
}

fn pair_lines(model: &ViewModel) -> Vec<Line<'static>> {
    let ViewBody::Pairs { rows } = &model.body else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| {
            let saved = -row.diff_mb;
            let verdict = if saved > 0.0 {
                Span::styled(
                    format!("saves {}", format_mb(saved)),
                    Style::default().fg(Color::Rgb(110, 200, 140)),
                )
            } else {
                Span::styled(
                    format!("grew by {}", format_mb(-saved)),
                    Style::default().fg(Color::Rgb(230, 130, 110)),
                )
            };
            Line::from(vec![
                Span::raw(format!(
                    "{:<30}",
                    paths::file_name(&row.original_path)
                )),
                Span::raw(format!("{:>10}  → ", format_mb(row.original_mb))),
                Span::raw(format!(
                    "{:<30}",
                    paths::file_name(&row.optimized_path)
                )),
                Span::raw(format!("{:>10}  ", format_mb(row.optimized_mb))),
                verdict,
            ])
        })
        .collect()
}

fn draw_ui(frame: &mut Frame, app: &mut App) {
    let root = frame.area();
    let split = Layout::horizontal([Constraint::Length(44), Constraint::Min(30)]).split(root);
    let (left, right) = (split[0], split[1]);

    let left_block = Block::default().title(" Mediamap ").borders(Borders::ALL);
    let left_inner = left_block.inner(left);
    frame.render_widget(left_block, left);

    let left_rows = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Min(6),
        Constraint::Length(7),
    ])
    .split(left_inner);

    let path_title = if app.input_mode == InputMode::Path {
        " Library path (typing) "
    } else {
        " Library path "
    };
    let path_block = Block::default().title(path_title).borders(Borders::ALL);
    let path_inner = path_block.inner(left_rows[0]);
    frame.render_widget(path_block, left_rows[0]);
    let path_style = if app.input_mode == InputMode::Path {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    frame.render_widget(Paragraph::new(app.scan_root.as_str()).style(path_style), path_inner);
    app.path_input_area = Some(path_inner);

    let search_title = if app.input_mode == InputMode::Search {
        " Search (typing) "
    } else {
        " Search "
    };
    let search_block = Block::default().title(search_title).borders(Borders::ALL);
    let search_inner = search_block.inner(left_rows[1]);
    frame.render_widget(search_block, left_rows[1]);
    frame.render_widget(
        Paragraph::new(app.search_text.as_str()).style(
            if app.input_mode == InputMode::Search {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            },
        ),
        search_inner,
    );

    let status_text = if app.is_scanning {
        match app.scan_progress.as_ref() {
            Some(progress) => format!(
                "Scanning... {} entries seen, {} media files",
                progress.discovered, progress.records
            ),
            None => String::from("Scanning..."),
        }
    } else {
        app.status.clone()
    };
    frame.render_widget(
        Paragraph::new(status_text)
            .block(Block::default().title(" Status ").borders(Borders::ALL)),
        left_rows[2],
    );

    let model = project(
        app.store.records(),
        &app.state,
        scanner::now_epoch_secs(),
    );

    let mut info_lines = vec![
        Line::from(vec![
            Span::styled("Workspace: ", Style::default().fg(Color::Gray)),
            Span::raw(workspace_label(app.state.criteria.workspace)),
            Span::raw("   "),
            Span::styled("Sort: ", Style::default().fg(Color::Gray)),
            Span::raw(sort_label(app.state.sort)),
        ]),
        Line::from(vec![
            Span::styled("Shown: ", Style::default().fg(Color::Gray)),
            Span::raw(format!(
                "{} items · {}",
                model.tally.count,
                format_mb(model.tally.total_size_mb)
            )),
        ]),
        Line::from(vec![
            Span::styled("Scale: ", Style::default().fg(Color::Gray)),
            Span::raw(if app.state.treemap.use_log { "log" } else { "linear" }),
            Span::raw("   "),
            Span::styled("Tags: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{}", app.tag_defs.len())),
        ]),
    ];
    if let Some(path) = app.selected_path.as_ref() {
        info_lines.push(Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(Color::Gray)),
            Span::raw(path.clone()),
        ]));
    }
    frame.render_widget(
        Paragraph::new(info_lines)
            .block(Block::default().title(" View ").borders(Borders::ALL)),
        left_rows[3],
    );

    let help = vec![
        Line::from("Enter/s: load   e: edit path   /: search"),
        Line::from("t: grid/treemap   g: log scale   w: workspace"),
        Line::from("1-4: sort size/bitrate/name/date"),
        Line::from("click: open/drill   u: up   r: top   c: clear"),
        Line::from("f: favorite   v: vault   q: quit"),
    ];
    frame.render_widget(
        Paragraph::new(help).block(Block::default().title(" Controls ").borders(Borders::ALL)),
        left_rows[4],
    );

    // Body: breadcrumbs in the border title, projection inside.
    let crumb_trail: Vec<String> = model
        .breadcrumbs
        .iter()
        .map(|crumb| crumb.label.clone())
        .collect();
    let body_block = Block::default()
        .title(format!(" {} ", crumb_trail.join(" / ")))
        .borders(Borders::ALL);
    let body_inner = body_block.inner(right);
    frame.render_widget(body_block, right);
    app.note_body_area(body_inner);

    let mut hit_regions = std::mem::take(&mut app.hit_regions);
    hit_regions.clear();
    match &model.body {
        ViewBody::Treemap { tiles } => {
            frame.render_widget(
                TreemapWidget {
                    tiles: tiles.as_slice(),
                    selected_path: app.selected_path.as_deref(),
                    hit_regions: &mut hit_regions,
                },
                body_inner,
            );
        }
        ViewBody::Grid { .. } => {
            let lines = grid_lines(
                &model,
                app.selected_path.as_deref(),
                body_inner,
                &mut hit_regions,
            );
            frame.render_widget(Paragraph::new(lines), body_inner);
        }
        ViewBody::Pairs { .. } => {
            frame.render_widget(Paragraph::new(pair_lines(&model)), body_inner);
        }
        ViewBody::Empty { message } => {
            frame.render_widget(
                Paragraph::new(message.as_str()).style(Style::default().fg(Color::Gray)),
                body_inner,
            );
        }
    }
    app.hit_regions = hit_regions;
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> io::Result<()> {
    let scan_root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let mut app = App::new(scan_root);
    app.load_library();

    loop {
        app.poll_scan_updates();
        app.poll_debouncers();

        terminal.draw(|frame| draw_ui(frame, &mut app))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                // The actual relayout is debounced off the redrawn area.
                Event::Resize(_, _) => {}
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
    }

    Ok(())
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    enable_raw_mode()?;
    crossterm::execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let app_result = run_app(&mut terminal);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app_result
}
