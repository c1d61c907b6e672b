use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use ohako::config::{default_db_path, AppConfig, Backend};
use ohako::model::{NewSong, NewTag, KeySetting, Song, SongPatch, TagPatch};
use ohako::photo::PhotoManager;
use ohako::repertoire::Repertoire;
use ohako::search::{self, Debouncer, QuerySpec, SortKey, SortOrder};
use ohako::store::local::LocalStore;
use ohako::store::remote::RemoteStore;
use ohako::store::RepertoireStore;

#[derive(Parser)]
#[command(name = "ohako", version, about = "Personal karaoke repertoire tracker")]
struct Cli {
    /// Path to the SQLite database (local backend)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Storage backend (overrides config)
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Local,
    Remote,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortKeyArg {
    /// Most recently updated first
    Updated,
    Title,
    Artist,
    Proficiency,
    Score,
}

impl SortKeyArg {
    fn key(self) -> SortKey {
        match self {
            Self::Updated => SortKey::UpdatedAt,
            Self::Title => SortKey::Title,
            Self::Artist => SortKey::Artist,
            Self::Proficiency => SortKey::Proficiency,
            Self::Score => SortKey::HighScore,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrderArg {
    Asc,
    Desc,
}

impl SortOrderArg {
    fn order(self) -> SortOrder {
        match self {
            Self::Asc => SortOrder::Asc,
            Self::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a song to the repertoire
    Add {
        title: String,
        artist: String,

        /// Tag names to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Proficiency rating, 1-5 stars
        #[arg(short, long, default_value = "3")]
        proficiency: u8,

        /// Original key (e.g. "B", "Am")
        #[arg(long, default_value = "")]
        key: String,

        /// Key adjustment in semitones, -6..+6
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        adjust: i8,

        /// Best score so far, 0-100
        #[arg(long)]
        score: Option<f64>,

        /// Free-text memo
        #[arg(short, long, default_value = "")]
        memo: String,
    },

    /// Edit a song (match by id or title substring)
    Edit {
        song: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        artist: Option<String>,

        /// Replace the tag set with these tag names (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(short, long)]
        proficiency: Option<u8>,

        #[arg(long)]
        key: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        adjust: Option<i8>,

        #[arg(long, conflicts_with = "clear_score")]
        score: Option<f64>,

        /// Remove the recorded score
        #[arg(long)]
        clear_score: bool,

        #[arg(short, long)]
        memo: Option<String>,
    },

    /// Remove a song (match by id or title substring)
    Remove { song: String },

    /// Show one song in detail (match by id or title substring)
    Show { song: String },

    /// List songs with optional filtering and sorting
    List {
        /// Filter by title/artist substring
        #[arg(short, long)]
        query: Option<String>,

        /// Filter by tag name. Repeat to match any of several
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Sort key
        #[arg(short, long, value_enum, default_value = "updated")]
        sort: SortKeyArg,

        /// Sort direction
        #[arg(long, value_enum, default_value = "desc")]
        order: SortOrderArg,

        /// Number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Interactive search with live (debounced) filtering
    Search,

    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommands),

    /// Manage score photos
    #[command(subcommand)]
    Photo(PhotoCommands),

    /// Look up title/artist candidates from the iTunes catalog
    Suggest { term: String },

    /// Follow live collection changes and reprint the list
    Watch,

    /// Show repertoire statistics
    Stats,
}

#[derive(Subcommand)]
enum TagCommands {
    /// List all tags
    List,

    /// Create a tag
    Add {
        name: String,

        /// Display color token
        #[arg(long, default_value = "#6366F1")]
        color: String,
    },

    /// Rename or recolor a tag (match by id or name)
    Edit {
        tag: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a tag. Songs carrying it lose it; they are not deleted.
    Remove { tag: String },
}

#[derive(Subcommand)]
enum PhotoCommands {
    /// Attach a score photo to a song (replaces any existing one)
    Attach {
        song: String,
        file: PathBuf,
    },

    /// Remove a song's score photo
    Remove { song: String },

    /// Write a song's score photo to a file
    Export {
        song: String,
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = AppConfig::load();

    let backend = match cli.backend {
        Some(BackendArg::Local) => Backend::Local,
        Some(BackendArg::Remote) => Backend::Remote,
        None => config.backend,
    };

    let store: Box<dyn RepertoireStore> = match backend {
        Backend::Local => {
            // Resolve database path: CLI > config > XDG default
            let db_path = cli
                .db_path
                .or(config.db_path.clone())
                .unwrap_or_else(default_db_path);
            log::info!("Database: {}", db_path.display());
            Box::new(LocalStore::open(&db_path).context("Failed to open database")?)
        }
        Backend::Remote => {
            if config.remote.base_url.is_empty() || config.remote.user_id.is_empty() {
                anyhow::bail!(
                    "Remote backend needs base_url and user_id in the [remote] config section."
                );
            }
            log::info!("Remote store: {}", config.remote.base_url);
            Box::new(RemoteStore::new(
                &config.remote.base_url,
                &config.remote.user_id,
                Duration::from_millis(config.remote.poll_interval_ms),
            ))
        }
    };

    let spinner = (backend == Backend::Remote).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap());
        pb.set_message("Fetching collection...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });
    let mut repertoire = Repertoire::open(store).context("Failed to open repertoire")?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match cli.command {
        Commands::Add { title, artist, tags, proficiency, key, adjust, score, memo } => {
            let tag_ids = resolve_tag_names(&repertoire, &tags)?;
            let song = repertoire
                .create_song(NewSong {
                    title,
                    artist,
                    tags: tag_ids,
                    proficiency,
                    key: KeySetting { original: key, adjustment: adjust },
                    high_score: score,
                    score_photo_id: None,
                    memo,
                })
                .context("Failed to add song")?;
            println!("Added \"{}\" / {} ({})", song.title, song.artist, song.id);
        }

        Commands::Edit {
            song, title, artist, tags, proficiency, key, adjust, score, clear_score, memo,
        } => {
            let song_id = resolve_song(&repertoire, &song)?;

            let tag_ids = if tags.is_empty() {
                None
            } else {
                Some(resolve_tag_names(&repertoire, &tags)?)
            };
            let new_key = match (key, adjust) {
                (None, None) => None,
                (k, a) => {
                    let current = repertoire
                        .song(&song_id)
                        .map(|s| s.key.clone())
                        .unwrap_or_default();
                    Some(KeySetting {
                        original: k.unwrap_or(current.original),
                        adjustment: a.unwrap_or(current.adjustment),
                    })
                }
            };
            let high_score = if clear_score {
                Some(None)
            } else {
                score.map(Some)
            };

            let patch = SongPatch {
                title,
                artist,
                tags: tag_ids,
                proficiency,
                key: new_key,
                high_score,
                score_photo_id: None,
                memo,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to change. Pass at least one field option.");
            }

            let updated = repertoire
                .update_song(&song_id, patch)
                .context("Failed to update song")?;
            println!("Updated \"{}\" / {}", updated.title, updated.artist);
        }

        Commands::Remove { song } => {
            let song_id = resolve_song(&repertoire, &song)?;
            let title = repertoire
                .song(&song_id)
                .map(|s| s.title.clone())
                .unwrap_or_else(|| song_id.clone());
            repertoire
                .delete_song(&song_id)
                .context("Failed to remove song")?;
            println!("Removed \"{title}\"");
        }

        Commands::Show { song } => {
            let song_id = resolve_song(&repertoire, &song)?;
            let song = repertoire
                .song(&song_id)
                .context("Song vanished mid-command")?;
            print_song_detail(&repertoire, song);
        }

        Commands::List { query, tags, sort, order, limit } => {
            let spec = QuerySpec {
                query: query.unwrap_or_default(),
                selected_tag_ids: resolve_tag_names(&repertoire, &tags)?,
                sort_key: sort.key(),
                sort_order: order.order(),
            };
            let mut songs = search::evaluate(repertoire.songs(), &spec);
            if let Some(n) = limit {
                songs.truncate(n);
            }

            if songs.is_empty() {
                println!("No songs match.");
                return Ok(());
            }
            print_song_table(&repertoire, &songs);
        }

        Commands::Search => {
            run_interactive_search(&repertoire, config.search.debounce_ms)?;
        }

        Commands::Tag(command) => match command {
            TagCommands::List => {
                if repertoire.tags().is_empty() {
                    println!("No tags.");
                    return Ok(());
                }
                println!("{:<20} {:>8} {:>6}  {}", "Name", "Color", "Songs", "Id");
                println!("{}", "-".repeat(72));
                for tag in repertoire.tags() {
                    let count = repertoire
                        .songs()
                        .iter()
                        .filter(|s| s.tags.iter().any(|t| *t == tag.id))
                        .count();
                    println!(
                        "{} {:>8} {:>6}  {}",
                        fit_display(&tag.name, 20),
                        tag.color,
                        count,
                        tag.id
                    );
                }
            }

            TagCommands::Add { name, color } => {
                let tag = repertoire
                    .create_tag(NewTag { name, color })
                    .context("Failed to add tag")?;
                println!("Added tag \"{}\" ({})", tag.name, tag.id);
            }

            TagCommands::Edit { tag, name, color } => {
                let tag_id = resolve_tag(&repertoire, &tag)?;
                if name.is_none() && color.is_none() {
                    anyhow::bail!("Nothing to change. Pass --name and/or --color.");
                }
                let updated = repertoire
                    .update_tag(&tag_id, TagPatch { name, color })
                    .context("Failed to update tag")?;
                println!("Updated tag \"{}\"", updated.name);
            }

            TagCommands::Remove { tag } => {
                let tag_id = resolve_tag(&repertoire, &tag)?;
                let name = repertoire
                    .tag(&tag_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| tag_id.clone());

                // Warn about references; the delete proceeds regardless.
                if repertoire.is_referenced(&tag_id) {
                    let count = repertoire
                        .songs()
                        .iter()
                        .filter(|s| s.tags.iter().any(|t| *t == tag_id))
                        .count();
                    println!("Tag \"{name}\" is used by {count} song(s); removing it from them.");
                }

                let result = repertoire
                    .delete_tag(&tag_id)
                    .context("Failed to remove tag")?;
                println!(
                    "Removed tag \"{}\" ({} song(s) updated)",
                    name, result.songs_updated
                );
                if result.cascade_errors > 0 {
                    println!(
                        "Warning: {} song(s) could not be updated and keep a stale tag id.",
                        result.cascade_errors
                    );
                }
            }
        },

        Commands::Photo(command) => match command {
            PhotoCommands::Attach { song, file } => {
                let song_id = resolve_song(&repertoire, &song)?;
                let raw = std::fs::read(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let manager = PhotoManager::new(repertoire.store());
                let photo_id = manager
                    .attach(&song_id, &raw)
                    .context("Failed to attach photo")?;
                repertoire.refresh().context("Failed to refresh")?;
                println!("Attached photo {photo_id}");
            }

            PhotoCommands::Remove { song } => {
                let song_id = resolve_song(&repertoire, &song)?;
                let manager = PhotoManager::new(repertoire.store());
                manager.detach(&song_id).context("Failed to remove photo")?;
                repertoire.refresh().context("Failed to refresh")?;
                println!("Removed photo");
            }

            PhotoCommands::Export { song, output } => {
                let song_id = resolve_song(&repertoire, &song)?;
                let photo_id = repertoire
                    .song(&song_id)
                    .and_then(|s| s.score_photo_id.clone())
                    .context("Song has no score photo")?;
                let manager = PhotoManager::new(repertoire.store());
                let bytes = manager
                    .resolve(&photo_id)
                    .context("Failed to load photo")?;
                std::fs::write(&output, &bytes)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                println!("Wrote {} ({} bytes)", output.display(), bytes.len());
            }
        },

        Commands::Suggest { term } => {
            let results =
                ohako::suggest::search_catalog(&term, &config.itunes.country, config.itunes.limit)
                    .context("Catalog lookup failed")?;

            if results.is_empty() {
                println!("No candidates for \"{term}\".");
                return Ok(());
            }
            println!("{:<30} {:<25} {}", "Track", "Artist", "Artwork");
            println!("{}", "-".repeat(90));
            for s in &results {
                println!(
                    "{} {} {}",
                    fit_display(&s.track, 30),
                    fit_display(&s.artist, 25),
                    s.artwork_url.as_deref().unwrap_or("-")
                );
            }
        }

        Commands::Watch => {
            let subscription = repertoire.subscribe().context("Failed to subscribe")?;
            println!("Watching for changes (Ctrl-C to stop)...");
            while let Some(snapshot) = subscription.recv() {
                repertoire.apply_snapshot(snapshot);
                println!();
                println!(
                    "--- {} song(s), {} tag(s) ---",
                    repertoire.songs().len(),
                    repertoire.tags().len()
                );
                let songs = repertoire.songs().to_vec();
                print_song_table(&repertoire, &songs);
            }
        }

        Commands::Stats => {
            let stats = repertoire.stats();
            println!("Repertoire Statistics");
            println!("=====================");
            println!("Songs:            {}", stats.total_songs);
            println!("With a score:     {}", stats.scored_songs);
            println!("Avg proficiency:  {:.1}", stats.avg_proficiency);
            if let Some(top) = stats.top_score {
                println!("Best score:       {top:.1}");
            }
            if !stats.tag_counts.is_empty() {
                println!();
                println!("Tags:");
                for (name, count) in &stats.tag_counts {
                    println!("  {} {}", fit_display(name, 20), count);
                }
            }
        }
    }

    Ok(())
}

/// Resolve a song argument: exact id first, then case-insensitive title
/// substring. Ambiguity is an error listing the candidates.
fn resolve_song(repertoire: &Repertoire, arg: &str) -> Result<String> {
    if let Some(song) = repertoire.song(arg) {
        return Ok(song.id.clone());
    }
    let needle = arg.to_lowercase();
    let matches: Vec<&Song> = repertoire
        .songs()
        .iter()
        .filter(|s| s.title.to_lowercase().contains(&needle))
        .collect();
    match matches.len() {
        0 => anyhow::bail!("No song matching \"{arg}\"."),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let listing: Vec<String> = matches
                .iter()
                .map(|s| format!("  \"{}\" / {} ({})", s.title, s.artist, s.id))
                .collect();
            anyhow::bail!(
                "\"{arg}\" matches {} songs:\n{}",
                matches.len(),
                listing.join("\n")
            )
        }
    }
}

/// Resolve a tag argument: exact id, then exact name.
fn resolve_tag(repertoire: &Repertoire, arg: &str) -> Result<String> {
    if let Some(tag) = repertoire.tag(arg) {
        return Ok(tag.id.clone());
    }
    repertoire
        .tags()
        .iter()
        .find(|t| t.name == arg)
        .map(|t| t.id.clone())
        .with_context(|| format!("No tag matching \"{arg}\". See `ohako tag list`."))
}

fn resolve_tag_names(repertoire: &Repertoire, names: &[String]) -> Result<Vec<String>> {
    names
        .iter()
        .map(|name| resolve_tag(repertoire, name))
        .collect()
}

/// Interactive search: every input line updates the query; filtering
/// runs once the input has been quiet for the debounce window. `tag:`,
/// `sort:` and `order:` prefixes adjust the rest of the query directly.
fn run_interactive_search(repertoire: &Repertoire, debounce_ms: u64) -> Result<()> {
    println!("Interactive search over {} song(s).", repertoire.songs().len());
    println!("Type to filter by title/artist. Commands:");
    println!("  tag:NAME    toggle a tag filter      sort:KEY    updated|title|artist|proficiency|score");
    println!("  order:DIR   asc|desc                 (empty line clears the query, Ctrl-D exits)");
    println!();

    let (sender, receiver) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { return };
            if sender.send(line).is_err() {
                return;
            }
        }
    });

    let mut debouncer = Debouncer::new(Duration::from_millis(debounce_ms));
    let mut spec = QuerySpec::default();
    render_search(repertoire, &spec, &debouncer);

    loop {
        // Block until the next input line, or exactly until the pending
        // window elapses.
        let wait = debouncer
            .time_to_deadline(Instant::now())
            .unwrap_or(Duration::from_secs(60));
        match receiver.recv_timeout(wait) {
            Ok(line) => {
                let line = line.trim();
                if let Some(name) = line.strip_prefix("tag:") {
                    match resolve_tag(repertoire, name.trim()) {
                        Ok(tag_id) => {
                            if let Some(pos) =
                                spec.selected_tag_ids.iter().position(|t| *t == tag_id)
                            {
                                spec.selected_tag_ids.remove(pos);
                            } else {
                                spec.selected_tag_ids.push(tag_id);
                            }
                            render_search(repertoire, &spec, &debouncer);
                        }
                        Err(e) => println!("{e}"),
                    }
                } else if let Some(key) = line.strip_prefix("sort:") {
                    match key.trim() {
                        "updated" => spec.sort_key = SortKey::UpdatedAt,
                        "title" => spec.sort_key = SortKey::Title,
                        "artist" => spec.sort_key = SortKey::Artist,
                        "proficiency" => spec.sort_key = SortKey::Proficiency,
                        "score" => spec.sort_key = SortKey::HighScore,
                        other => {
                            println!("Unknown sort key \"{other}\".");
                            continue;
                        }
                    }
                    render_search(repertoire, &spec, &debouncer);
                } else if let Some(dir) = line.strip_prefix("order:") {
                    match dir.trim() {
                        "asc" => spec.sort_order = SortOrder::Asc,
                        "desc" => spec.sort_order = SortOrder::Desc,
                        other => {
                            println!("Unknown order \"{other}\".");
                            continue;
                        }
                    }
                    render_search(repertoire, &spec, &debouncer);
                } else {
                    debouncer.input(line, Instant::now());
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if debouncer.poll(Instant::now()) {
            spec.query = debouncer.settled().to_string();
            render_search(repertoire, &spec, &debouncer);
        }
    }

    Ok(())
}

fn render_search(repertoire: &Repertoire, spec: &QuerySpec, debouncer: &Debouncer) {
    let songs = search::evaluate(repertoire.songs(), spec);

    println!();
    let tag_names: Vec<String> = spec
        .selected_tag_ids
        .iter()
        .filter_map(|id| repertoire.tag(id).map(|t| t.name.clone()))
        .collect();
    let mut header = format!("query: \"{}\"", spec.query);
    if !tag_names.is_empty() {
        header.push_str(&format!("  tags: {}", tag_names.join(", ")));
    }
    if debouncer.is_pending() {
        header.push_str("  (typing...)");
    }
    println!("{header}");

    if songs.is_empty() {
        println!("No songs match.");
        return;
    }
    print_song_table(repertoire, &songs);
}

/// Truncate (with an ellipsis) and pad a string to a display width,
/// counting wide (CJK) characters as two cells. Slicing bytes would
/// split multibyte titles; char counts would misalign the columns.
fn fit_display(s: &str, width: usize) -> String {
    let total: usize = s.chars().map(char_width).sum();
    let mut out = String::new();
    let mut used = 0;
    if total <= width {
        out.push_str(s);
        used = total;
    } else {
        let budget = width.saturating_sub(1); // room for the ellipsis
        for c in s.chars() {
            let w = char_width(c);
            if used + w > budget {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push('…');
        used += 1;
    }
    for _ in used..width {
        out.push(' ');
    }
    out
}

fn char_width(c: char) -> usize {
    // Rough but sufficient for table alignment: CJK blocks and fullwidth
    // forms take two cells.
    match c as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6 => 2,
        _ => 1,
    }
}

fn print_song_table(repertoire: &Repertoire, songs: &[Song]) {
    println!(
        "{} {} {:>3} {:>5} {:>6}  {} {}",
        fit_display("Title", 26),
        fit_display("Artist", 18),
        "★",
        "Key",
        "Score",
        fit_display("Tags", 24),
        "Updated"
    );
    println!("{}", "-".repeat(100));

    for song in songs {
        let key = if song.key.adjustment == 0 {
            "±0".to_string()
        } else {
            format!("{:+}", song.key.adjustment)
        };
        let score = song
            .high_score
            .map(|s| format!("{s:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let tags: Vec<&str> = repertoire
            .display_tags(song)
            .iter()
            .map(|t| t.name.as_str())
            .collect();

        println!(
            "{} {} {:>3} {:>5} {:>6}  {} {}",
            fit_display(&song.title, 26),
            fit_display(&song.artist, 18),
            song.proficiency,
            key,
            score,
            fit_display(&tags.join(","), 24),
            song.updated_at.format("%Y-%m-%d")
        );
    }
}

fn print_song_detail(repertoire: &Repertoire, song: &Song) {
    println!("{} / {}", song.title, song.artist);
    println!("{}", "=".repeat(40));
    println!("Proficiency:  {}", "★".repeat(song.proficiency as usize));
    if song.key.original.is_empty() {
        println!("Key:          {:+} semitones", song.key.adjustment);
    } else {
        println!(
            "Key:          {} ({:+} semitones)",
            song.key.original, song.key.adjustment
        );
    }
    match song.high_score {
        Some(score) => println!("High score:   {score:.1}"),
        None => println!("High score:   (none)"),
    }

    let tags = repertoire.display_tags(song);
    if tags.is_empty() {
        println!("Tags:         (none)");
    } else {
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        println!("Tags:         {}", names.join(", "));
    }

    match &song.score_photo_id {
        Some(id) => println!("Score photo:  {id}"),
        None => println!("Score photo:  (none)"),
    }
    if !song.memo.is_empty() {
        println!("Memo:         {}", song.memo);
    }
    println!();
    println!("Added:        {}", song.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated:      {}", song.updated_at.format("%Y-%m-%d %H:%M"));
    println!("Id:           {}", song.id);
}
