// 该文件是 Jingchen （净尘） 项目的一部分。
// src/input/read_image_file.rs - 本地镜像目录图像来源
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::{ImageSource, InputError, object_key},
};

/// 从本地目录读取已同步的对象，路径为 `{root}/{object_key}`
pub struct ImageFileSource {
  root: PathBuf,
}

impl ImageFileSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl FromUrlWithScheme for ImageFileSource {
  const SCHEME: &'static str = "mirror";
}

impl FromUrl for ImageFileSource {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch(url.scheme().to_string()));
    }

    Ok(ImageFileSource::new(url.path()))
  }
}

impl ImageSource for ImageFileSource {
  fn fetch(&self, image_url: &str) -> Result<Vec<u8>, InputError> {
    let path = self.root.join(object_key(image_url));
    debug!("读取本地图像: {}", path.display());
    Ok(std::fs::read(path)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_object_under_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("results/97")).unwrap();
    std::fs::write(dir.path().join("results/97/frame.jpg"), b"jpeg").unwrap();

    let url = Url::parse(&format!("mirror://{}", dir.path().display())).unwrap();
    let source = ImageFileSource::from_url(&url).unwrap();

    let bytes = source
      .fetch("https://bucket.s3.amazonaws.com/results/97/frame.jpg")
      .unwrap();
    assert_eq!(bytes, b"jpeg");
    assert!(matches!(
      source.fetch("https://bucket.s3.amazonaws.com/results/97/missing.jpg"),
      Err(InputError::IoError(_))
    ));
  }
}
