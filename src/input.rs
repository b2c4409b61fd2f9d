// 该文件是 Jingchen （净尘） 项目的一部分。
// src/input.rs - 检测图像来源
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

use thiserror::Error;

use crate::FromUrl;

/// 按记录中的图像 URL 取回原始图像字节
pub trait ImageSource {
  fn fetch(&self, image_url: &str) -> Result<Vec<u8>, InputError>;
}

/// 对象键为 URL 中最后一个 `com/` 之后的部分，没有 `com/` 时取整个 URL
pub fn object_key(image_url: &str) -> &str {
  image_url.rsplit("com/").next().unwrap_or(image_url)
}

#[cfg(feature = "read_image_file")]
mod read_image_file;
#[cfg(feature = "read_image_file")]
pub use self::read_image_file::ImageFileSource;

#[cfg(feature = "s3_input")]
mod s3_source;
#[cfg(feature = "s3_input")]
pub use self::s3_source::S3ImageSource;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("S3 下载失败: {0}")]
  S3Error(String),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("图像来源地址错误: {0}")]
  InvalidUrl(String),
}

pub enum InputWrapper {
  #[cfg(feature = "s3_input")]
  S3(S3ImageSource),
  #[cfg(feature = "read_image_file")]
  ReadImageFile(ImageFileSource),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "s3_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == S3ImageSource::SCHEME {
        return Ok(InputWrapper::S3(S3ImageSource::from_url(url)?));
      }
    }
    #[cfg(feature = "read_image_file")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == ImageFileSource::SCHEME {
        return Ok(InputWrapper::ReadImageFile(ImageFileSource::from_url(url)?));
      }
    }
    Err(InputError::SchemeMismatch(url.scheme().to_string()))
  }
}

impl ImageSource for InputWrapper {
  fn fetch(&self, image_url: &str) -> Result<Vec<u8>, InputError> {
    match self {
      #[cfg(feature = "s3_input")]
      InputWrapper::S3(source) => source.fetch(image_url),
      #[cfg(feature = "read_image_file")]
      InputWrapper::ReadImageFile(source) => source.fetch(image_url),
    }
  }
}
