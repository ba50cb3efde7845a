//! Builtin fallback data: seed sites and the tag vocabulary
//!
//! The crawler prefers externally supplied seeds and tags (see
//! `storage::traits::FrontierSource` and `storage::traits::TagVocabulary`)
//! but must keep harvesting when those sources are unreachable. These lists
//! are the degraded-mode defaults.

use std::collections::BTreeSet;

/// Default seed sites used when no frontier source is reachable and the
/// config supplies no seeds of its own.
pub const DEFAULT_SEED_SITES: &[&str] = &[
    "https://blog.jetbrains.com/",
    "https://www.geeksforgeeks.org/",
    "https://www.analyticsvidhya.com/blog/",
    "https://www.digitalocean.com/blog",
    "https://pyimagesearch.com/",
    "https://developer.nvidia.com/blog/",
    "https://www.thoughtworks.com/",
    "https://www.linuxfoundation.org/blog",
    "https://blogs.oracle.com/",
    "https://www.kdnuggets.com/",
    "https://machinelearningmastery.com/",
    "https://www.smashingmagazine.com/",
    "https://aws.amazon.com/blogs/",
    "https://developer.ibm.com/blogs/",
    "https://devblogs.microsoft.com/",
    "https://thenewstack.io/",
    "https://techcrunch.com/",
    "https://dzone.com/",
    "https://www.infoq.com/",
    "https://towardsdatascience.com/",
    "https://jvns.ca/",
    "https://netflixtechblog.com/",
    "https://hackernoon.com/",
    "https://www.freecodecamp.org/news",
];

/// Builtin tag vocabulary matched against normalized page titles.
///
/// Multi-word tags are hyphen-joined; the scraper matches them against
/// adjacent title tokens as well as single tokens.
pub const DEFAULT_TAG_VOCABULARY: &[&str] = &[
    ".net",
    "ai",
    "algorithms",
    "android",
    "angular",
    "apache",
    "api",
    "arm",
    "assembly",
    "aws",
    "azure",
    "backend",
    "bash",
    "big-data",
    "bitcoin",
    "blockchain",
    "c",
    "c#",
    "c++",
    "chatgpt",
    "ci-cd",
    "cloud",
    "cloudflare",
    "coding",
    "compilers",
    "computer-vision",
    "cpp",
    "crawler",
    "crypto",
    "css",
    "cuda",
    "dart",
    "data",
    "data-analysis",
    "data-science",
    "database",
    "deep-learning",
    "devops",
    "django",
    "dns",
    "docker",
    "dotnet",
    "elixir",
    "embedded",
    "embeddings",
    "erlang",
    "firebase",
    "flask",
    "frontend",
    "game-development",
    "gcp",
    "genai",
    "git",
    "github",
    "golang",
    "google",
    "gpt",
    "graphql",
    "hardware",
    "haskell",
    "html",
    "huggingface",
    "intel",
    "ios",
    "java",
    "javascript",
    "jenkins",
    "jupyter",
    "jvm",
    "jwt",
    "keras",
    "kotlin",
    "kubernetes",
    "langchain",
    "laravel",
    "linux",
    "llama",
    "llm",
    "machine-learning",
    "math",
    "microsoft",
    "ml",
    "mlops",
    "mobile",
    "mongodb",
    "mozilla",
    "neural-networks",
    "nlp",
    "nodejs",
    "nosql",
    "npm",
    "numpy",
    "nvidia",
    "oauth",
    "ollama",
    "open-source",
    "openai",
    "opencv",
    "pandas",
    "perl",
    "php",
    "postgresql",
    "python",
    "pytorch",
    "r",
    "rag",
    "react",
    "redis",
    "rest-api",
    "robotics",
    "ruby",
    "rust",
    "scala",
    "security",
    "shell",
    "spark",
    "sql",
    "swift",
    "tensorflow",
    "terraform",
    "testing",
    "text-generation",
    "text-to-image",
    "text-to-speech",
    "transformers",
    "typescript",
    "ubuntu",
    "unity",
    "unix",
    "ux",
    "vim",
    "vscode",
    "vue",
    "web3",
    "webassembly",
    "wasm",
];

/// Returns the default seed list as owned strings
pub fn default_seed_urls() -> Vec<String> {
    DEFAULT_SEED_SITES.iter().map(|s| s.to_string()).collect()
}

/// Returns the builtin tag vocabulary as a set
pub fn default_tag_vocabulary() -> BTreeSet<String> {
    DEFAULT_TAG_VOCABULARY
        .iter()
        .map(|s| s.to_string())
        .collect()
}
