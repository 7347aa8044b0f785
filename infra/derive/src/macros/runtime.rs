use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{Error, ItemFn, LitInt, LitStr, Result, ReturnType, Type};

#[derive(Default)]
struct MainArgs {
    multi_thread: bool,
    workers: Option<LitInt>,
    thread_name: Option<LitStr>,
}

/// Expands `#[tether_runtime::main(...)]`.
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    parse_args(args)
        .and_then(|args| check_signature(&input).map(|()| args))
        .map_or_else(|err| err.to_compile_error(), |args| render(&args, &input))
}

fn parse_args(tokens: TokenStream) -> Result<MainArgs> {
    let mut args = MainArgs::default();
    syn::meta::parser(|meta| {
        if meta.path.is_ident("cooperative") {
            args.multi_thread = false;
        } else if meta.path.is_ident("multi_thread") {
            args.multi_thread = true;
        } else if meta.path.is_ident("workers") {
            args.multi_thread = true;
            args.workers = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("thread_name") {
            args.thread_name = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error(
                "expected `cooperative`, `multi_thread`, `workers = N` or `thread_name = \"..\"`",
            ));
        }
        Ok(())
    })
    .parse2(tokens)?;
    Ok(args)
}

fn check_signature(input: &ItemFn) -> Result<()> {
    if input.sig.asyncness.is_none() {
        return Err(Error::new_spanned(
            input.sig.fn_token,
            "#[tether_runtime::main] requires an `async fn`",
        ));
    }
    if !input.sig.inputs.is_empty() {
        return Err(Error::new_spanned(&input.sig.inputs, "the entry point takes no arguments"));
    }
    let is_result = match &input.sig.output {
        ReturnType::Type(_, ty) => match &**ty {
            Type::Path(path) => path.path.segments.last().is_some_and(|seg| seg.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    };
    if is_result {
        Ok(())
    } else {
        Err(Error::new_spanned(&input.sig, "#[tether_runtime::main] must return a `Result`"))
    }
}

fn render(args: &MainArgs, input: &ItemFn) -> TokenStream {
    let mut config = if args.multi_thread {
        match &args.workers {
            Some(workers) => quote! {
                ::tether_runtime::RuntimeConfig::cooperative().with_workers(#workers)
            },
            None => quote! { ::tether_runtime::RuntimeConfig::multi_thread() },
        }
    } else {
        quote! { ::tether_runtime::RuntimeConfig::cooperative() }
    };
    if let Some(name) = &args.thread_name {
        config = quote! { #config.with_thread_name(#name) };
    }

    let ItemFn { attrs, vis, sig, block } = input;
    let (name, output) = (&sig.ident, &sig.output);

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            async fn tether_entry() #output #block

            let config = #config;
            ::tether_runtime::run(&config, tether_entry())
        }
    }
}
