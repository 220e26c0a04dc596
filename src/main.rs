use clap::Parser;
use daisyforge::daisy::{logging, DEFAULT_CONFIG_PATH};
use daisyforge::{ChapterKind, Daisy, Format, ReaderConfig, Result, Verbosity};
use std::path::Path;
use std::process;

/// 🎧 DaisyForge - Daisy 2.02 有声读物工具
#[derive(Parser)]
#[command(name = "daisyforge")]
#[command(about = "一个用于解析和导航Daisy 2.02有声读物的Rust工具")]
#[command(version)]
struct Args {
    /// ncc.html 路径
    #[arg(help = "有声读物的 ncc.html 路径")]
    path: String,

    /// 文档格式
    #[arg(long, value_enum, default_value = "auto", help = "文档格式（auto 表示根据文件名识别）")]
    format: Format,

    /// 配置文件
    #[arg(long, help = "YAML配置文件路径，不存在时生成默认配置")]
    config: Option<String>,

    /// 详细输出模式
    #[arg(short, long, help = "输出全部解析诊断")]
    verbose: bool,

    /// 安静模式
    #[arg(short, long, conflicts_with = "verbose", help = "只输出错误")]
    quiet: bool,

    /// 显示元数据信息
    #[arg(short, long, help = "显示书籍元数据")]
    metadata: bool,

    /// 显示章节列表
    #[arg(long, help = "显示全部章节")]
    chapters: bool,

    /// 定位章节
    #[arg(short, long, help = "定位到指定章节（从1开始）")]
    chapter: Option<usize>,

    /// 定位段落
    #[arg(short, long, help = "定位到章节中的指定段落（从1开始）")]
    passage: Option<usize>,

    /// 按时间定位
    #[arg(short, long, conflicts_with = "passage", help = "定位到章节中包含该时间（毫秒）的段落")]
    time: Option<u64>,

    /// 显示标题路径
    #[arg(long, help = "显示当前章节的标题路径")]
    heading: bool,
}

fn main() {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            process::exit(1);
        }
    };

    let verbosity = if args.verbose {
        Verbosity::Verbose
    } else if args.quiet {
        Verbosity::Error
    } else {
        config.verbosity
    };

    let mut daisy = Daisy::new(config);
    match logging::init(verbosity) {
        Ok(handle) => daisy = daisy.with_log_handle(handle),
        Err(e) => eprintln!("⚠️  {}", e),
    }
    if let Err(e) = daisy.set_verbosity(verbosity) {
        eprintln!("⚠️  {}", e);
    }

    println!("🎧 DaisyForge - Daisy有声读物工具");
    println!("正在加载: {}", args.path);

    match process_book(&mut daisy, &args) {
        Ok(_) => println!("🎉 处理完成！"),
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            process::exit(1);
        }
    }
}

/// 读取配置文件，指定的文件不存在时先生成默认配置
fn load_config(path: Option<&str>) -> Result<ReaderConfig> {
    match path {
        Some(path) => {
            if !Path::new(path).exists() {
                ReaderConfig::write_default(path)?;
                println!("📝 已生成默认配置文件: {}", path);
            }
            ReaderConfig::from_file(path)
        }
        None => ReaderConfig::load_or_default(DEFAULT_CONFIG_PATH),
    }
}

fn process_book(daisy: &mut Daisy, args: &Args) -> Result<()> {
    daisy.load(&args.path, args.format)?;

    let document = daisy.document()?;
    println!("\n📚 已加载 {} 个章节 (格式: {})", document.chapter_count(), document.format());
    if document.is_degraded() {
        println!("  ⚠️  文档不完全符合Daisy 2.02规范，详见日志");
    } else {
        println!("  ✅ 文档符合Daisy 2.02规范");
    }

    if args.metadata {
        display_metadata(daisy)?;
    }

    if args.chapters {
        display_chapters(daisy)?;
    }

    if let Some(timestamp) = args.time {
        let passage = daisy.seek_by_time(args.chapter, timestamp)?;
        println!("\n⏱️  {} ms 位于段落 {}", timestamp, passage);
    } else if args.chapter.is_some() || args.passage.is_some() {
        daisy.seek(args.chapter, args.passage)?;
    }

    display_position(daisy)?;

    if args.heading {
        println!("\n🧭 标题路径: {}", daisy.heading_path()?);
    }

    Ok(())
}

/// 显示书籍元数据
fn display_metadata(daisy: &Daisy) -> Result<()> {
    let info = daisy.book_info()?;
    println!("\n📊 书籍信息:");
    println!("    标题: {}", info.title().unwrap_or("未知"));
    println!("    作者: {}", info.author().unwrap_or("未知"));
    println!("    朗读者: {}", info.narrator().unwrap_or("未知"));
    match (info.total_time(), info.total_time_seconds()) {
        (Some(text), Some(seconds)) => println!("    总时长: {} ({} 秒)", text, seconds),
        (Some(text), None) => println!("    总时长: {}", text),
        _ => println!("    总时长: 未知"),
    }
    Ok(())
}

/// 显示章节列表
fn display_chapters(daisy: &Daisy) -> Result<()> {
    println!("\n📖 章节列表:");
    for chapter in daisy.document()?.chapters().iter() {
        let indent = "  ".repeat(chapter.level().map_or(2, usize::from));
        println!(
            "{}{}. [{}] {} -> {}{}",
            indent,
            chapter.id,
            kind_label(chapter.kind),
            chapter.header.as_deref().unwrap_or(""),
            chapter.anchor,
            chapter.fragment.as_deref().map(|f| format!("#{}", f)).unwrap_or_default()
        );
    }
    Ok(())
}

/// 显示当前章节和段落
fn display_position(daisy: &Daisy) -> Result<()> {
    let chapter = daisy.chapter()?;
    println!("\n📄 当前章节 {}: {}", chapter.id, chapter.header.as_deref().unwrap_or(""));
    println!("    类型: {}", kind_label(chapter.kind));
    println!("    SMIL: {}", chapter.anchor);
    if let Some(duration) = &chapter.duration {
        println!("    时长: {}", duration);
    }
    if let Some(elapsed) = &chapter.elapsed_time {
        println!("    已播放: {}", elapsed);
    }

    if let Ok(passage) = daisy.passage() {
        println!("\n🔊 当前段落 {}:", passage.id);
        println!("    音频: {}", passage.audio_uri.as_deref().unwrap_or("无"));
        println!("    区间: [{}, {}) ms", passage.start_ms, passage.stop_ms);
        if let Some(file) = &passage.text_file {
            println!(
                "    文本: {}{}",
                file,
                passage.text_fragment.as_deref().map(|f| format!("#{}", f)).unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn kind_label(kind: ChapterKind) -> String {
    match kind {
        ChapterKind::Heading(level) => format!("h{}", level.get()),
        ChapterKind::Page => "page".to_string(),
        ChapterKind::Block => "block".to_string(),
    }
}
