//! Main frame rendering and layout.
//!
//! Layout: title bar, tab bar, tab content, status bar. Overlays (login,
//! create form, help, quit confirmation) render centered on top of the
//! dimmed normal frame. The login overlay is drawn exclusively: while the
//! session is not valid, no protected content reaches the screen.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::{now_ms, App, AppState, LoginFocus, NoticeLevel, Tab};
use crate::ui::styles;

/// Render the full frame.
pub fn render(frame: &mut Frame, app: &App) {
    // Login screen replaces everything; nothing protected leaks through
    if app.state == AppState::LoggingIn {
        render_login(frame, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // tabs
            Constraint::Min(3),    // content
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

    render_title(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    match app.state {
        AppState::Editing => render_entry_form(frame, app),
        AppState::ShowingHelp => render_help(frame),
        AppState::ConfirmingQuit => render_quit_confirm(frame),
        _ => {}
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("costbench", styles::title_style()),
        Span::raw("  "),
        Span::styled(
            format!("role: {}", app.role()),
            styles::highlight_style(),
        ),
    ];
    if let Some(item) = &app.selected_item {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("item: {}", item.part_number),
            styles::success_style(),
        ));
    }
    if app.refreshing {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("refreshing...", styles::muted_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for (i, tab) in Tab::ALL.iter().enumerate() {
        spans.push(Span::styled(
            format!(" {}:{} ", i + 1, tab.title()),
            styles::tab_style(*tab == app.current_tab),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Countries => render_countries(frame, app, area),
        Tab::MachineTypes => render_machine_types(frame, app, area),
        Tab::Makes => render_makes(frame, app, area),
        Tab::ModelSizes => render_model_sizes(frame, app, area),
        Tab::ItemMasters => render_item_masters(frame, app, area),
        Tab::ProcessFlows => render_process_flows(frame, app, area),
        Tab::MachineRates => render_machine_rates(frame, app, area),
        Tab::CostAggregates => render_cost_aggregates(frame, app, area),
    }
}

/// Build a bordered table widget with the standard selection styling.
fn data_table<'a>(
    title: String,
    header: Vec<&'a str>,
    rows: Vec<Vec<String>>,
    selection: usize,
    widths: &'a [Constraint],
) -> Table<'a> {
    let header_row = Row::new(
        header
            .into_iter()
            .map(|h| Cell::from(h).style(styles::header_style())),
    );

    let body = rows.into_iter().enumerate().map(|(i, cells)| {
        let style = if i == selection {
            styles::selected_style()
        } else {
            styles::row_style()
        };
        Row::new(cells.into_iter().map(Cell::from)).style(style)
    });

    Table::new(body, widths.iter().copied())
        .header(header_row)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(true))
                .title(title),
        )
}

fn render_countries(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .countries
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.currency_symbol.clone(),
                format!("{:.2}", c.labor_rate),
                format!("{:.2}", c.electricity_rate),
                format!("{:.2}", c.water_rate),
                format!("{:.2}", c.space_rental_rate),
                format!("{:.4}", c.exchange_rate),
            ]
        })
        .collect();
    let widths = [
        Constraint::Min(14),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(10),
    ];
    let table = data_table(
        "Countries".to_string(),
        vec!["Name", "Currency", "Labor", "Electricity", "Water", "Rental", "FX"],
        rows,
        app.countries_selection,
        &widths,
    );
    frame.render_widget(table, area);
}

fn render_machine_types(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .machine_types
        .iter()
        .map(|t| vec![t.id.to_string(), t.name.clone()])
        .collect();
    let widths = [Constraint::Length(6), Constraint::Min(20)];
    let table = data_table(
        "Machine Types".to_string(),
        vec!["Id", "Name"],
        rows,
        app.types_selection,
        &widths,
    );
    frame.render_widget(table, area);
}

fn render_makes(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .makes
        .iter()
        .map(|m| vec![m.id.to_string(), m.make.clone()])
        .collect();
    let widths = [Constraint::Length(6), Constraint::Min(20)];
    let table = data_table(
        "Makes".to_string(),
        vec!["Id", "Make"],
        rows,
        app.makes_selection,
        &widths,
    );
    frame.render_widget(table, area);
}

fn render_model_sizes(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .model_sizes
        .iter()
        .map(|m| vec![m.id.to_string(), m.model_name.clone()])
        .collect();
    let widths = [Constraint::Length(6), Constraint::Min(20)];
    let table = data_table(
        "Model/Sizes".to_string(),
        vec!["Id", "Model"],
        rows,
        app.sizes_selection,
        &widths,
    );
    frame.render_widget(table, area);
}

fn render_item_masters(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .item_masters
        .iter()
        .map(|i| {
            vec![
                i.part_number.clone(),
                i.description.clone(),
                i.material.clone(),
                format!("{:.2}", i.cost_per_unit),
                i.annual_volume.to_string(),
            ]
        })
        .collect();
    let widths = [
        Constraint::Length(16),
        Constraint::Min(24),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(12),
    ];
    let table = data_table(
        "Item Masters (Enter to select)".to_string(),
        vec!["Part #", "Description", "Material", "Cost/Unit", "Annual Vol"],
        rows,
        app.items_selection,
        &widths,
    );
    frame.render_widget(table, area);
}

fn render_process_flows(frame: &mut Frame, app: &App, area: Rect) {
    if app.selected_item.is_none() {
        render_select_item_hint(frame, area, "Process Flows");
        return;
    }
    let rows = app
        .process_flows
        .iter()
        .map(|f| {
            vec![
                f.operation.clone(),
                f.description.clone(),
                f.cycle_time_sec.to_string(),
                format!("{:.1}", f.yield_percentage),
                format!("{:.1}", f.operator_count),
            ]
        })
        .collect();
    let widths = [
        Constraint::Length(12),
        Constraint::Min(24),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(10),
    ];
    let table = data_table(
        "Process Flows".to_string(),
        vec!["Operation", "Description", "Cycle (s)", "Yield %", "Operators"],
        rows,
        app.flows_selection,
        &widths,
    );
    frame.render_widget(table, area);
}

fn render_machine_rates(frame: &mut Frame, app: &App, area: Rect) {
    if app.selected_item.is_none() {
        render_select_item_hint(frame, area, "Machine Rates");
        return;
    }
    let rows = app
        .machine_rates
        .iter()
        .map(|r| {
            vec![
                r.machine_type.clone(),
                r.make.clone(),
                r.model_size.clone(),
                format!("{:.0}", r.purchase_dollar),
                format!("{:.1}", r.utilization),
                format!("{:.2}", r.total_dollar_hr),
            ]
        })
        .collect();
    let widths = [
        Constraint::Min(14),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(10),
    ];
    let country = app.current_country_name().unwrap_or("-");
    let title = format!("Machine Rates [{}] (c to cycle country)", country);
    let table = data_table(
        title,
        vec!["Type", "Make", "Model", "Purchase", "Util %", "$/hr"],
        rows,
        app.rates_selection,
        &widths,
    );
    frame.render_widget(table, area);
}

fn render_cost_aggregates(frame: &mut Frame, app: &App, area: Rect) {
    if app.selected_item.is_none() {
        render_select_item_hint(frame, area, "Cost Aggregates");
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(7)])
        .split(area);

    let rows = app
        .cost_aggregates
        .iter()
        .map(|a| {
            vec![
                a.operation.clone(),
                format!("{:.2}", a.machine_rate),
                format!("{:.2}", a.labor_rate),
                format!("{:.3}", a.total_operating_cost),
                format!("{:.3}", a.yield_loss_cost),
                format!("{:.3}", a.total_cost),
            ]
        })
        .collect();
    let widths = [
        Constraint::Min(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = data_table(
        "Cost Aggregates".to_string(),
        vec!["Operation", "Mach Rate", "Labor", "Op Cost", "Yield Loss", "Total"],
        rows,
        app.aggregates_selection,
        &widths,
    );
    frame.render_widget(table, chunks[0]);

    // Breakdown panel: client-side percentages, plus the backend rollup
    // when it has arrived
    let ac = &app.additional_costs;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Material handling (2%): ", styles::muted_style()),
            Span::raw(format!("{:.3}", ac.material_handling)),
        ]),
        Line::from(vec![
            Span::styled("Overheads (7.5%):       ", styles::muted_style()),
            Span::raw(format!("{:.3}", ac.overheads)),
        ]),
        Line::from(vec![
            Span::styled("Profit (7.5%):          ", styles::muted_style()),
            Span::raw(format!("{:.3}", ac.profit)),
        ]),
        Line::from(vec![
            Span::styled("Total cost:             ", styles::header_style()),
            Span::styled(format!("{:.3}", ac.total_cost), styles::header_style()),
        ]),
    ];
    if let Some(fc) = &app.final_cost {
        lines.push(Line::from(vec![
            Span::styled("Server final cost:      ", styles::success_style()),
            Span::styled(format!("{:.3}", fc.final_total_cost), styles::success_style()),
        ]));
    }
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false))
            .title("Additional Costs"),
    );
    frame.render_widget(panel, chunks[1]);
}

fn render_select_item_hint(frame: &mut Frame, area: Rect, title: &str) {
    let hint = Paragraph::new("Select an item master first (5, then Enter)")
        .style(styles::muted_style())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(false))
                .title(title.to_string()),
        );
    frame.render_widget(hint, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();

    if let Some(notice) = &app.notice {
        let style = match notice.level {
            NoticeLevel::Info => styles::success_style(),
            NoticeLevel::Warn => styles::warn_style(),
            NoticeLevel::Error => styles::error_style(),
        };
        spans.push(Span::styled(notice.text.clone(), style));
        spans.push(Span::raw("  "));
    }

    if let Some(session) = app.guard.session() {
        let mins = ((session.expires_at_ms - now_ms()).max(0)) / 60_000;
        spans.push(Span::styled(
            format!("session: {}m left", mins),
            styles::muted_style(),
        ));
        spans.push(Span::raw("  "));
    }

    spans.push(Span::styled(
        "a:add e:edit d:delete u:refresh L:logout ?:help q:quit",
        styles::muted_style(),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(styles::status_bar_style()),
        area,
    );
}

// ============================================================================
// Overlays
// ============================================================================

fn render_login(frame: &mut Frame, app: &App) {
    let area = centered_rect(46, 13, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(" costbench login ");
    frame.render_widget(block, area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // username
            Constraint::Length(3), // password
            Constraint::Length(1), // button
            Constraint::Length(1), // spacer
            Constraint::Length(2), // error
        ])
        .split(area);

    let username = Paragraph::new(app.login_username.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(app.login_focus == LoginFocus::Username))
            .title("Username"),
    );
    frame.render_widget(username, inner[0]);

    let masked = "*".repeat(app.login_password.chars().count());
    let password = Paragraph::new(masked).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(app.login_focus == LoginFocus::Password))
            .title("Password"),
    );
    frame.render_widget(password, inner[1]);

    let button_style = if app.login_focus == LoginFocus::Button {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    let button = Paragraph::new("[ Log in ]")
        .style(button_style)
        .alignment(Alignment::Center);
    frame.render_widget(button, inner[2]);

    // A session-expiry notice carries over onto the login screen so the
    // user can see why they landed here
    if let Some(error) = &app.login_error {
        let err = Paragraph::new(error.as_str())
            .style(styles::error_style())
            .alignment(Alignment::Center);
        frame.render_widget(err, inner[4]);
    } else if let Some(notice) = &app.notice {
        let style = match notice.level {
            NoticeLevel::Warn => styles::warn_style(),
            NoticeLevel::Error => styles::error_style(),
            NoticeLevel::Info => styles::success_style(),
        };
        let msg = Paragraph::new(notice.text.clone())
            .style(style)
            .alignment(Alignment::Center);
        frame.render_widget(msg, inner[4]);
    }
}

fn render_entry_form(frame: &mut Frame, app: &App) {
    let form = match &app.form {
        Some(form) => form,
        None => return,
    };

    let height = (form.fields.len() as u16) * 3 + 4;
    let area = centered_rect(52, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(format!(" {} (Enter to advance, Esc to cancel) ", form.title()));
    frame.render_widget(block, area);

    let mut constraints: Vec<Constraint> =
        form.fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1));

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(area);

    for (i, field) in form.fields.iter().enumerate() {
        let widget = Paragraph::new(field.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(i == form.active))
                .title(field.label),
        );
        frame.render_widget(widget, inner[i]);
    }

    if let Some(error) = &form.error {
        let err = Paragraph::new(error.as_str())
            .style(styles::error_style())
            .alignment(Alignment::Center);
        frame.render_widget(err, inner[form.fields.len()]);
    }
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(56, 18, frame.area());
    frame.render_widget(Clear, area);

    let entries: &[(&str, &str)] = &[
        ("1-8 / arrows", "switch tab"),
        ("j/k", "move selection"),
        ("Enter", "select item master (on Item Masters)"),
        ("a", "add a row on the current tab"),
        ("e", "edit the selected row"),
        ("d", "delete the selected row"),
        ("A", "resolve a machine-rate edit request"),
        ("Del", "forget saved password (on login)"),
        ("c", "cycle country (on Machine Rates)"),
        ("u", "refresh all data"),
        ("L", "log out"),
        ("Esc", "dismiss message"),
        ("q", "quit"),
        ("?", "close this help"),
    ];

    let lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{:>14}  ", key), styles::help_key_style()),
                Span::styled(*desc, styles::help_desc_style()),
            ])
        })
        .collect();

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true))
            .title(" Help "),
    );
    frame.render_widget(help, area);
}

fn render_quit_confirm(frame: &mut Frame) {
    let area = centered_rect(34, 5, frame.area());
    frame.render_widget(Clear, area);

    let msg = Paragraph::new("Quit? (y/n)")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(true))
                .title(" Confirm "),
        );
    frame.render_widget(msg, area);
}

/// Centered rectangle of fixed width/height, clamped to the frame.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
