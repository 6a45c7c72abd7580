use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

/// File stem yt-dlp writes caption tracks under (`captions.<lang>.json3`).
pub const CAPTION_STEM: &str = "captions";
pub const CAPTION_FORMAT: &str = "json3";

/// Get the cache directory for a given video id
pub fn get_cache_dir(video_id: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    video_id.hash(&mut hasher);
    let id_hash = hasher.finish();

    get_root_cache_dir().join(id_hash.to_string())
}

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("kaabil")
}

/// Get the path of a caption track for one language
pub fn get_caption_path(cache_dir: &Path, lang: &str) -> PathBuf {
    cache_dir.join(format!("{CAPTION_STEM}.{lang}.{CAPTION_FORMAT}"))
}

/// Find the first cached caption track, in language preference order
pub fn find_captions_in_cache(cache_dir: &Path, languages: &[String]) -> Option<(String, PathBuf)> {
    languages.iter().find_map(|lang| {
        let path = get_caption_path(cache_dir, lang);
        path.is_file().then(|| (lang.clone(), path))
    })
}
