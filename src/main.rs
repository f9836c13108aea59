use futures::{stream, Stream, StreamExt};
use std::{io::Result, path::PathBuf};
use tokio::fs::{metadata, read_dir};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pvr_tool::{export, load_texture, MipOptions, SoftwareBackend};

fn visit(path: impl Into<PathBuf>) -> impl Stream<Item = Result<PathBuf>> + Send + 'static {
    async fn one_level(path: PathBuf, to_visit: &mut Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        if !metadata(&path).await?.is_dir() {
            return Ok(vec![path]);
        }
        let mut dir = read_dir(path).await?;
        let mut files = Vec::new();

        while let Some(child) = dir.next_entry().await? {
            let child_path = child.path();
            if child.metadata().await?.is_dir() {
                to_visit.push(child_path);
            } else if child_path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("pvr"))
            {
                files.push(child_path)
            }
        }
        Ok(files)
    }

    stream::unfold(vec![path.into()], |mut to_visit| async {
        let path = to_visit.pop()?;
        let file_stream = match one_level(path, &mut to_visit).await {
            Ok(files) => stream::iter(files).map(Ok).left_stream(),
            Err(e) => stream::once(async { Err(e) }).right_stream(),
        };
        Some((file_stream, to_visit))
    })
    .flatten()
}

fn convert(path: PathBuf, output_dir: Option<PathBuf>, options: MipOptions) {
    let mut backend = SoftwareBackend::new();
    let id = match load_texture(&mut backend, &path, options) {
        Ok(id) => id,
        Err(e) => {
            error!("{:?}: {}", path, e);
            return;
        }
    };
    let texture = match backend.texture(id) {
        Some(texture) => texture,
        None => return,
    };
    let upload = &texture.upload;
    println!(
        "{:?}: {}x{} format {:#010x} {:?} level {} ({} bytes)",
        path,
        upload.width,
        upload.height,
        upload.format,
        upload.kind,
        upload.mip_level,
        texture.data.len()
    );

    if let Some(dir) = output_dir {
        let name = path.with_extension("png");
        let name = match name.file_name() {
            Some(name) => name,
            None => return,
        };
        let out = dir.join(name);
        match export::save_png(texture, &out) {
            Ok(()) => info!("wrote {:?}", out),
            Err(e) => error!("{:?}: {}", path, e),
        }
    }
}

async fn bootstrap(path: &str, output: Option<&str>, options: MipOptions) {
    let paths = visit(path);
    let out_dir = output.map(PathBuf::from);
    if let Some(dir) = &out_dir {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            error!("cannot create {:?}: {}", dir, e);
            return;
        }
    }

    paths
        .for_each(|entry| {
            let out_dir = out_dir.clone();
            async move {
                match entry {
                    Ok(path) => {
                        let task = tokio::task::spawn_blocking(move || convert(path, out_dir, options));
                        if let Err(e) = task.await {
                            error!("conversion task failed: {}", e);
                        }
                    }
                    Err(e) => error!("encountered an error: {}", e),
                }
            }
        })
        .await;
}

use clap::{App, Arg};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = App::new("PVR texture tool")
        .version("0.0.1")
        .author("zhylmzr <zhylmzr@gmail.com>")
        .arg(
            Arg::with_name("input")
                .help("Set the PVR file or directory of textures")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("dir")
                .help("Export the base level of each texture as PNG into this directory")
                .required(false),
        )
        .arg(
            Arg::with_name("mipmapped")
                .long("mipmapped")
                .help("Textures already contain their mip levels"),
        )
        .arg(
            Arg::with_name("gen-mips")
                .long("gen-mips")
                .help("Build mip levels on the host"),
        )
        .get_matches();

    let input = matches.value_of("input").unwrap_or(".");
    let output = matches.value_of("output");
    let options = MipOptions {
        has_embedded_mips: matches.is_present("mipmapped"),
        generate_host_mips: matches.is_present("gen-mips"),
    };

    bootstrap(input, output, options).await;
}
