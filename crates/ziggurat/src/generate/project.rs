//! The build-descriptor generator.
//!
//! One descriptor per context with storage or presentation content,
//! concatenated into a single artifact with a context banner. The build
//! flags are static — ahead-of-time compilation and server GC — with no
//! customization point.

use std::fmt::Write;

use log::debug;

use ziggurat_core::ast::Program;

pub(crate) fn generate(program: &Program) -> Option<String> {
    let mut out = String::new();
    let mut emitted = false;

    for context in &program.contexts {
        // An empty storage block is no content, same as the schema generator.
        let has_storage = context.storage.as_ref().is_some_and(|s| !s.is_empty());
        if !has_storage && context.presentation.is_none() {
            continue;
        }
        emitted = true;

        debug!(context = context.name; "Generating build descriptor");
        let _ = writeln!(out, "<!-- ============================================= -->");
        let _ = writeln!(out, "<!-- Build descriptor for context: {} -->", context.name);
        let _ = writeln!(out, "<!-- ============================================= -->");
        out.push_str(DESCRIPTOR_BODY);
        out.push('\n');
    }

    emitted.then_some(out)
}

const DESCRIPTOR_BODY: &str = r#"<Project Sdk="Microsoft.NET.Sdk">

  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <ImplicitUsings>enable</ImplicitUsings>
    <Nullable>enable</Nullable>
    <PublishAot>true</PublishAot>
    <InvariantGlobalization>true</InvariantGlobalization>
    <ServerGarbageCollection>true</ServerGarbageCollection>
    <ConcurrentGarbageCollection>true</ConcurrentGarbageCollection>
  </PropertyGroup>

  <ItemGroup>
    <PackageReference Include="Akka" Version="1.5.15" />
  </ItemGroup>

</Project>
"#;
